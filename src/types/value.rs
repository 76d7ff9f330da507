//! Runtime values returned by relational stores.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime value container for a single store cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// 64-bit signed integer value.
    Int64(i64),
    /// 64-bit floating point value.
    Float64(f64),
    /// Boolean value.
    Bool(bool),
    /// String value (also carries dates and timestamps as text).
    String(String),
    /// Null value.
    Null,
}

impl Value {
    /// Returns true if the value is null or an empty string.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Builds a value from raw text, mapping the empty string to null.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A single row read from a relational store, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    /// Creates a new empty row.
    #[must_use]
    pub fn new() -> Self {
        Row {
            values: HashMap::new(),
        }
    }

    /// Sets a column value in the row.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Builder-style variant of [`Row::set`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Gets a value by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Returns the number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keeps only the listed columns.
    #[must_use]
    pub fn project(&self, columns: &[String]) -> Row {
        let mut row = Row::new();
        for col in columns {
            if let Some(v) = self.values.get(col) {
                row.set(col.clone(), v.clone());
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::String(String::new()).is_blank());
        assert!(!Value::String("0".into()).is_blank());
        assert!(!Value::Int64(0).is_blank());
    }

    #[test]
    fn test_display_stringifies_like_store_text() {
        assert_eq!(Value::Int64(42).to_string(), "42");
        assert_eq!(Value::Float64(2.5).to_string(), "2.5");
        assert_eq!(Value::from("o'clock").to_string(), "o'clock");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn test_row_projection() {
        let row = Row::new().with("a", 1_i64).with("b", "x");
        let projected = row.project(&["b".to_string(), "missing".to_string()]);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected.get("b"), Some(&Value::from("x")));
    }
}
