//! Per-render table bindings and column resolution.

use std::collections::{BTreeMap, HashMap};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::binder::constraints::TypeConstraints;
use crate::catalog::{ColumnDef, SchemaTable};
use crate::parser::{ColumnId, TableId};
use crate::sample::{SampleMap, SampleProvider};

/// One table id's binding for the duration of a single render.
///
/// Holds the chosen table, the type-filtered candidates per column id, the
/// memo of resolved columns, and the lazily fetched sample map. Never shared
/// between renders.
#[derive(Debug, Clone)]
pub struct TableBinding<'c> {
    table: &'c SchemaTable,
    constraints: TypeConstraints,
    /// Column id -> columns satisfying its constraint. May be empty.
    candidates: BTreeMap<ColumnId, Vec<&'c ColumnDef>>,
    /// Column id -> resolved column.
    column_map: HashMap<ColumnId, &'c ColumnDef>,
    samples: Option<SampleMap>,
}

impl<'c> TableBinding<'c> {
    /// Binds `table` and precomputes filtered candidates for every constrained column id.
    #[must_use]
    pub fn new(table: &'c SchemaTable, constraints: TypeConstraints) -> Self {
        let candidates = constraints
            .iter()
            .map(|(&column_id, expected)| (column_id, table.columns_matching(expected)))
            .collect();
        TableBinding {
            table,
            constraints,
            candidates,
            column_map: HashMap::new(),
            samples: None,
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &'c str {
        &self.table.name
    }

    #[must_use]
    pub fn constraints(&self) -> &TypeConstraints {
        &self.constraints
    }

    /// Filtered candidates for a column id, if it was constrained.
    #[must_use]
    pub fn candidates(&self, column_id: ColumnId) -> Option<&[&'c ColumnDef]> {
        self.candidates.get(&column_id).map(Vec::as_slice)
    }

    /// Column already resolved for `column_id`, if any.
    #[must_use]
    pub fn resolved(&self, column_id: ColumnId) -> Option<&'c ColumnDef> {
        self.column_map.get(&column_id).copied()
    }

    /// Resolves a column id to a column, memoized for this binding.
    ///
    /// The first reference draws uniformly from the filtered candidates; if
    /// none exist it draws from every column of the table. Returns `None`
    /// only for a table without columns.
    pub fn resolve_column<R: Rng + ?Sized>(
        &mut self,
        column_id: ColumnId,
        rng: &mut R,
    ) -> Option<&'c ColumnDef> {
        if let Some(col) = self.resolved(column_id) {
            return Some(col);
        }

        let table = self.table;
        let filtered = self.candidates.get(&column_id).map_or(&[][..], Vec::as_slice);
        let chosen = if let Some(&col) = filtered.choose(rng) {
            col
        } else {
            if let Some(expected) = self.constraints.get(&column_id) {
                debug!(
                    table = %table.name,
                    column_id,
                    %expected,
                    "no column satisfies the constraint, choosing from all columns"
                );
            }
            table.columns.choose(rng)?
        };

        debug!(
            table = %table.name,
            column_id,
            column = %chosen.name,
            declared = %chosen.declared_type,
            "column resolved"
        );
        self.column_map.insert(column_id, chosen);
        Some(chosen)
    }

    /// Sample map of the bound table, fetched on first use and then cached.
    pub fn samples<R: Rng + ?Sized>(
        &mut self,
        provider: &SampleProvider<'_>,
        rng: &mut R,
    ) -> &SampleMap {
        let table = self.table;
        self.samples
            .get_or_insert_with(|| provider.fetch(table, rng))
    }

    /// True once the sample map has been fetched.
    #[must_use]
    pub fn has_samples(&self) -> bool {
        self.samples.is_some()
    }
}

/// All table bindings of one render, keyed by table id.
#[derive(Debug, Clone, Default)]
pub struct BindingSet<'c> {
    bindings: BTreeMap<TableId, TableBinding<'c>>,
}

impl<'c> BindingSet<'c> {
    #[must_use]
    pub fn new() -> Self {
        BindingSet {
            bindings: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, table_id: TableId, binding: TableBinding<'c>) {
        self.bindings.insert(table_id, binding);
    }

    #[must_use]
    pub fn get(&self, table_id: TableId) -> Option<&TableBinding<'c>> {
        self.bindings.get(&table_id)
    }

    pub fn get_mut(&mut self, table_id: TableId) -> Option<&mut TableBinding<'c>> {
        self.bindings.get_mut(&table_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound table name per table id.
    #[must_use]
    pub fn table_names(&self) -> BTreeMap<TableId, &'c str> {
        self.bindings
            .iter()
            .map(|(&id, b)| (id, b.table_name()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::MemoryStore;
    use crate::types::{ExpectedType, Row};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table() -> SchemaTable {
        SchemaTable::new(
            "t",
            vec![
                ColumnDef::new("id", "int").unwrap(),
                ColumnDef::new("name", "varchar(10)").unwrap(),
                ColumnDef::new("born", "date").unwrap(),
            ],
        )
        .unwrap()
    }

    fn constraints(pairs: &[(ColumnId, &str)]) -> TypeConstraints {
        pairs
            .iter()
            .map(|&(id, tag)| (id, ExpectedType::parse(tag)))
            .collect()
    }

    #[test]
    fn test_constrained_column_respects_type() {
        let t = table();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let mut b = TableBinding::new(&t, constraints(&[(1, "string")]));
            assert_eq!(b.resolve_column(1, &mut rng).unwrap().name, "name");
        }
    }

    #[test]
    fn test_memoized_per_binding() {
        let t = table();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut b = TableBinding::new(&t, constraints(&[(1, "all")]));
        let first = b.resolve_column(1, &mut rng).unwrap().name.clone();
        for _ in 0..10 {
            assert_eq!(b.resolve_column(1, &mut rng).unwrap().name, first);
        }
    }

    #[test]
    fn test_empty_candidates_fall_back_to_all_columns() {
        let t = table();
        let mut b = TableBinding::new(&t, constraints(&[(1, "boolean")]));
        assert_eq!(b.candidates(1).map(<[_]>::len), Some(0));
        // StepRng(0, 0) always draws the first element.
        let mut rng = StepRng::new(0, 0);
        assert_eq!(b.resolve_column(1, &mut rng).unwrap().name, "id");
    }

    #[test]
    fn test_unconstrained_id_uses_all_columns() {
        let t = table();
        let mut b = TableBinding::new(&t, TypeConstraints::new());
        assert!(b.candidates(4).is_none());
        let mut rng = StepRng::new(0, 0);
        assert_eq!(b.resolve_column(4, &mut rng).unwrap().name, "id");
    }

    #[test]
    fn test_table_without_columns_resolves_nothing() {
        let t = SchemaTable {
            name: "bare".into(),
            columns: Vec::new(),
        };
        let mut b = TableBinding::new(&t, constraints(&[(1, "number")]));
        assert!(b.resolve_column(1, &mut StepRng::new(0, 0)).is_none());
        assert!(b.resolved(1).is_none());
    }

    #[test]
    fn test_samples_fetched_once() {
        let t = table();
        let store =
            MemoryStore::new().with_table("db", "t", vec![Row::new().with("id", 1_i64)]);
        let provider = SampleProvider::new(&store, "db");
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut b = TableBinding::new(&t, TypeConstraints::new());
        assert!(!b.has_samples());
        assert_eq!(b.samples(&provider, &mut rng).literal("id"), "1");
        assert_eq!(b.samples(&provider, &mut rng).literal("name"), "NULL");
        assert_eq!(store.connections_opened(), 1);
    }
}
