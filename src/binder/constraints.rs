//! Expected-type alignment and per-table type constraints.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::parser::{ColumnId, Placeholder, TableId};
use crate::types::ExpectedType;

/// Column id -> expected type, for one table id.
pub type TypeConstraints = BTreeMap<ColumnId, ExpectedType>;

/// Pads with `all` or truncates so there is exactly one tag per placeholder.
#[must_use]
pub fn normalize_expected_types(mut types: Vec<ExpectedType>, count: usize) -> Vec<ExpectedType> {
    types.resize(count, ExpectedType::ALL);
    types
}

/// Zips expected-type tags onto placeholders in text order.
///
/// An empty tag list leaves every placeholder at `all`. A non-empty list of
/// the wrong length is normalized and logged.
pub fn assign_expected_types(
    placeholders: &mut [Placeholder],
    types: &[ExpectedType],
    template: &str,
) {
    if !types.is_empty() && types.len() != placeholders.len() {
        let kinds: Vec<&str> = placeholders.iter().map(Placeholder::kind_name).collect();
        warn!(
            expected = types.len(),
            placeholders = placeholders.len(),
            ?kinds,
            ?types,
            template,
            "expected_types length does not match placeholder count"
        );
    }
    let types = normalize_expected_types(types.to_vec(), placeholders.len());
    for (placeholder, ty) in placeholders.iter_mut().zip(types) {
        placeholder.expected_type = ty;
    }
}

/// Collects `table_id -> (column_id -> expected type)` from column and sample
/// placeholders.
///
/// The first constraint seen for a column id wins, except that a later
/// concrete tag replaces an earlier `all`. Conflicting concrete tags are
/// logged and ignored.
#[must_use]
pub fn collect_constraints(placeholders: &[Placeholder]) -> BTreeMap<TableId, TypeConstraints> {
    let mut constraints: BTreeMap<TableId, TypeConstraints> = BTreeMap::new();
    for p in placeholders {
        let Some((table_id, column_id)) = p.column_ref() else {
            continue;
        };
        let per_table = constraints.entry(table_id).or_default();
        match per_table.get(&column_id) {
            None => {
                per_table.insert(column_id, p.expected_type.clone());
            }
            Some(existing) if existing.is_all() => {
                per_table.insert(column_id, p.expected_type.clone());
            }
            Some(existing) if !p.expected_type.is_all() && *existing != p.expected_type => {
                debug!(
                    table_id,
                    column_id,
                    kept = %existing,
                    ignored = %p.expected_type,
                    "conflicting type constraints, keeping the first"
                );
            }
            Some(_) => {}
        }
    }
    constraints
}

/// Distinct table ids referenced by any placeholder, in ascending order.
#[must_use]
pub fn referenced_table_ids(placeholders: &[Placeholder]) -> BTreeSet<TableId> {
    placeholders
        .iter()
        .filter_map(Placeholder::table_id)
        .collect()
}
