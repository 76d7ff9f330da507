//! Binder for template placeholders.
//!
//! Binding runs once per render and resolves:
//! - Expected-type tags against placeholders, in text order
//! - Table ids against schema tables, honoring column type constraints
//! - Column ids against columns of the bound table, memoized per render
//!
//! The resulting [`BindingSet`] is owned by a single render call.

mod binding;
mod constraints;
mod table_binder;

pub use binding::{BindingSet, TableBinding};
pub use constraints::{
    assign_expected_types, collect_constraints, normalize_expected_types, referenced_table_ids,
    TypeConstraints,
};
pub use table_binder::{satisfies, TableBinder, DEFAULT_MAX_TABLE_ATTEMPTS};
