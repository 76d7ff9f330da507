//! Template placeholder parsing.

pub mod ast;
mod grammar;

pub use ast::{ColumnId, Placeholder, PlaceholderKind, TableId};
pub use grammar::parse_placeholders;
