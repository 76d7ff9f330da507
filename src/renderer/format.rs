//! SQL literal formatting and identifier quoting.

use serde::{Deserialize, Serialize};

use crate::types::TypeCategory;

/// Sentinel emitted for missing or unavailable samples. Never quoted.
pub const NULL_LITERAL: &str = "NULL";

/// Identifier-quoting convention of the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Back-ticks.
    #[default]
    MySql,
    /// Double quotes.
    Postgres,
    /// Square brackets.
    SqlServer,
}

impl Dialect {
    /// Quotes an identifier unconditionally, doubling any embedded closing quote.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", name.replace('`', "``")),
            Dialect::Postgres => format!("\"{}\"", name.replace('"', "\"\"")),
            Dialect::SqlServer => format!("[{}]", name.replace(']', "]]")),
        }
    }

    /// Renders a column name for a payload, quoting only names that would not
    /// parse as bare identifiers (spaces, hyphens, parentheses).
    #[must_use]
    pub fn column_reference(&self, name: &str) -> String {
        if name.contains([' ', '-', '(']) {
            self.quote_identifier(name)
        } else {
            name.to_string()
        }
    }
}

/// Renders sampled values as SQL literals for their declared column type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFormatter;

impl ValueFormatter {
    /// Formats `value` for a column declared as `declared_type`.
    ///
    /// - `NULL` stays `NULL`.
    /// - Numeric columns get the value unquoted.
    /// - Date/time columns get the value single-quoted verbatim.
    /// - String columns get the value single-quoted with `'` doubled.
    /// - Other columns leave numeric-looking values bare and quote the rest.
    #[must_use]
    pub fn format(value: &str, declared_type: &str) -> String {
        if value == NULL_LITERAL {
            return NULL_LITERAL.to_string();
        }
        match TypeCategory::of_declared(declared_type) {
            TypeCategory::Number => value.to_string(),
            TypeCategory::Date => format!("'{value}'"),
            TypeCategory::String => quote_string(value),
            TypeCategory::Boolean | TypeCategory::All => {
                if looks_numeric(value) {
                    value.to_string()
                } else {
                    quote_string(value)
                }
            }
        }
    }
}

/// Single-quotes a string literal, doubling embedded single quotes.
#[must_use]
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// True when the text is digits once `.` and `-` are removed (e.g. `-3.5`, `2024-01-01`).
#[must_use]
pub fn looks_numeric(value: &str) -> bool {
    let mut digits = value.chars().filter(|c| *c != '.' && *c != '-').peekable();
    digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_string_against_declared_types() {
        assert_eq!(ValueFormatter::format("5", "varchar"), "'5'");
        assert_eq!(ValueFormatter::format("5", "int"), "5");
        assert_eq!(ValueFormatter::format("5", "VARCHAR(10)"), "'5'");
        assert_eq!(ValueFormatter::format("1", "bit"), "1");
        assert_eq!(ValueFormatter::format("5", "json"), "5");
    }

    #[test]
    fn test_null_is_never_quoted() {
        for ty in ["int", "varchar", "date", "json", "bool"] {
            assert_eq!(ValueFormatter::format("NULL", ty), "NULL");
        }
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(ValueFormatter::format("O'Brien", "text"), "'O''Brien'");
        assert_eq!(ValueFormatter::format("abc", "json"), "'abc'");
    }

    #[test]
    fn test_interval_is_not_a_number() {
        assert_eq!(ValueFormatter::format("1 day", "interval"), "'1 day'");
        assert_eq!(ValueFormatter::format("42", "int(11) unsigned"), "42");
    }

    #[test]
    fn test_dates_quoted_verbatim() {
        assert_eq!(
            ValueFormatter::format("2024-01-02 10:00:00", "datetime"),
            "'2024-01-02 10:00:00'"
        );
        assert_eq!(ValueFormatter::format("12:30:00", "time"), "'12:30:00'");
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("42"));
        assert!(looks_numeric("-3.25"));
        assert!(looks_numeric("2024-01-01"));
        assert!(!looks_numeric(""));
        assert!(!looks_numeric("-."));
        assert!(!looks_numeric("1e5"));
        assert!(!looks_numeric("abc"));
    }

    #[test]
    fn test_column_reference_quoting() {
        assert_eq!(Dialect::MySql.column_reference("name"), "name");
        assert_eq!(Dialect::MySql.column_reference("first name"), "`first name`");
        assert_eq!(Dialect::MySql.column_reference("a-b"), "`a-b`");
        assert_eq!(Dialect::MySql.column_reference("sum(x)"), "`sum(x)`");
        assert_eq!(Dialect::Postgres.column_reference("a b"), "\"a b\"");
        assert_eq!(Dialect::SqlServer.column_reference("a b"), "[a b]");
        assert_eq!(Dialect::MySql.quote_identifier("we`ird"), "`we``ird`");
    }
}
