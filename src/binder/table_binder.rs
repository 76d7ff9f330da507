//! Table assignment under per-column type constraints.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use tracing::{debug, warn};

use crate::binder::binding::{BindingSet, TableBinding};
use crate::binder::constraints::{collect_constraints, referenced_table_ids, TypeConstraints};
use crate::catalog::{SchemaCatalog, SchemaTable};
use crate::error::{Result, SynthError};
use crate::parser::Placeholder;

/// Default number of random draws per table id before falling back.
pub const DEFAULT_MAX_TABLE_ATTEMPTS: usize = 50;

/// Assigns every table id of a template to a concrete schema table.
#[derive(Debug, Clone, Copy)]
pub struct TableBinder<'c> {
    catalog: &'c SchemaCatalog,
    max_attempts: usize,
}

impl<'c> TableBinder<'c> {
    #[must_use]
    pub fn new(catalog: &'c SchemaCatalog) -> Self {
        TableBinder {
            catalog,
            max_attempts: DEFAULT_MAX_TABLE_ATTEMPTS,
        }
    }

    /// Sets the draw budget per table id.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Binds every distinct table id referenced by `placeholders`.
    ///
    /// Each id gets up to `max_attempts` uniform draws from the table pool. A
    /// draw is accepted when every constrained column id of that table id has
    /// at least one matching column. Tables already bound to another id are
    /// skipped while the pool is large enough to give every id its own table.
    /// When the budget runs out an unconstrained table is drawn instead.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` if the template references a table id but the
    /// catalog has no tables.
    pub fn bind<R: Rng + ?Sized>(
        &self,
        placeholders: &[Placeholder],
        rng: &mut R,
    ) -> Result<BindingSet<'c>> {
        let mut bindings = BindingSet::new();
        let table_ids = referenced_table_ids(placeholders);
        if table_ids.is_empty() {
            return Ok(bindings);
        }

        let pool = self.catalog.tables();
        if pool.is_empty() {
            return Err(SynthError::SchemaError(format!(
                "Database '{}' has no tables to bind {} table id(s)",
                self.catalog.database_name(),
                table_ids.len()
            )));
        }

        let mut constraints = collect_constraints(placeholders);
        let distinct = pool.len() >= table_ids.len();
        let mut used: HashSet<usize> = HashSet::new();

        for table_id in table_ids {
            let type_constraints = constraints.remove(&table_id).unwrap_or_default();
            let index = match self.draw_satisfying(pool, &type_constraints, distinct, &used, rng) {
                Some(index) => {
                    used.insert(index);
                    index
                }
                None => {
                    let index = rng.gen_range(0..pool.len());
                    warn!(
                        table_id,
                        table = %pool[index].name,
                        attempts = self.max_attempts,
                        "no table satisfies the type constraints, choosing at random"
                    );
                    index
                }
            };

            let binding = TableBinding::new(&pool[index], type_constraints);
            debug!(
                table_id,
                table = binding.table_name(),
                candidates = ?candidate_names(&binding),
                "table bound"
            );
            bindings.insert(table_id, binding);
        }

        Ok(bindings)
    }

    fn draw_satisfying<R: Rng + ?Sized>(
        &self,
        pool: &[SchemaTable],
        constraints: &TypeConstraints,
        distinct: bool,
        used: &HashSet<usize>,
        rng: &mut R,
    ) -> Option<usize> {
        for _ in 0..self.max_attempts {
            let index = rng.gen_range(0..pool.len());
            if distinct && used.contains(&index) {
                continue;
            }
            if satisfies(&pool[index], constraints) {
                return Some(index);
            }
        }
        None
    }
}

/// Returns true if every constrained column id has at least one matching column.
#[must_use]
pub fn satisfies(table: &SchemaTable, constraints: &TypeConstraints) -> bool {
    constraints.values().all(|expected| {
        table
            .columns
            .iter()
            .any(|c| expected.admits(&c.declared_type))
    })
}

fn candidate_names<'a>(binding: &'a TableBinding<'_>) -> BTreeMap<u32, Vec<&'a str>> {
    binding
        .constraints()
        .keys()
        .map(|&id| {
            let names = binding
                .candidates(id)
                .unwrap_or_default()
                .iter()
                .map(|c| c.name.as_str())
                .collect();
            (id, names)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::constraints::assign_expected_types;
    use crate::catalog::ColumnDef;
    use crate::parser::parse_placeholders;
    use crate::types::ExpectedType;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new(
            "shop",
            vec![
                SchemaTable::new("notes", vec![ColumnDef::new("body", "text").unwrap()])
                    .unwrap(),
                SchemaTable::new(
                    "orders",
                    vec![
                        ColumnDef::new("id", "int").unwrap(),
                        ColumnDef::new("placed", "datetime").unwrap(),
                    ],
                )
                .unwrap(),
                SchemaTable::new(
                    "users",
                    vec![
                        ColumnDef::new("id", "bigint").unwrap(),
                        ColumnDef::new("name", "varchar(32)").unwrap(),
                    ],
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    fn placeholders(template: &str, types: &[&str]) -> Vec<Placeholder> {
        let mut ps = parse_placeholders(template).unwrap();
        let types: Vec<ExpectedType> = types.iter().map(|t| ExpectedType::parse(t)).collect();
        assign_expected_types(&mut ps, &types, template);
        ps
    }

    #[test]
    fn test_no_table_ids_binds_nothing() {
        let cat = catalog();
        let ps = placeholders("' OR 1=1 --", &[]);
        let set = TableBinder::new(&cat)
            .bind(&ps, &mut StepRng::new(0, 0))
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_constraints_steer_table_choice() {
        let cat = catalog();
        let ps = placeholders(
            "$table_1$ $column_t1_1$ $column_t1_2$",
            &["table", "number", "date"],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            let set = TableBinder::new(&cat).bind(&ps, &mut rng).unwrap();
            assert_eq!(set.get(1).unwrap().table_name(), "orders");
        }
    }

    #[test]
    fn test_distinct_tables_when_pool_is_large_enough() {
        let cat = catalog();
        let ps = placeholders("$table_1$ $table_2$ $table_3$", &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let set = TableBinder::new(&cat).bind(&ps, &mut rng).unwrap();
        let names: HashSet<&str> = set.table_names().into_values().collect();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_unsatisfiable_constraint_falls_back() {
        let cat = catalog();
        let ps = placeholders("$table_1$ $column_t1_1$", &["table", "boolean"]);
        let set = TableBinder::new(&cat)
            .with_max_attempts(5)
            .bind(&ps, &mut StepRng::new(0, 0))
            .unwrap();
        let binding = set.get(1).unwrap();
        assert_eq!(binding.table_name(), "notes");
        assert_eq!(binding.candidates(1).map(<[_]>::len), Some(0));
    }

    #[test]
    fn test_only_referenced_ids_are_bound() {
        let cat = catalog();
        let ps = placeholders("$table_3$", &[]);
        let set = TableBinder::new(&cat)
            .bind(&ps, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get(1).is_none());
        assert!(set.get(3).is_some());
    }

    #[test]
    fn test_huge_table_id_binds_one_table() {
        let cat = catalog();
        let ps = placeholders("$table_4000000000$ $column_t4000000000_1$", &["table", "date"]);
        let set = TableBinder::new(&cat)
            .bind(&ps, &mut ChaCha8Rng::seed_from_u64(9))
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(4_000_000_000).unwrap().table_name(), "orders");
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let cat = SchemaCatalog::new("empty", vec![]).unwrap();
        let ps = placeholders("$table_1$", &[]);
        let err = TableBinder::new(&cat)
            .bind(&ps, &mut StepRng::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, SynthError::SchemaError(_)));
    }

    #[test]
    fn test_satisfies() {
        let cat = catalog();
        let users = cat.get_table("users").unwrap();
        let mut c = TypeConstraints::new();
        c.insert(1, ExpectedType::parse("string"));
        assert!(satisfies(users, &c));
        c.insert(2, ExpectedType::parse("date"));
        assert!(!satisfies(users, &c));
        assert!(satisfies(users, &TypeConstraints::new()));
    }
}
