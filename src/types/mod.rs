//! Core value and type definitions.

mod category;
mod value;

pub use category::{ExpectedType, InformationFeature, LiteralKind, TypeCategory};
pub use value::{Row, Value};
