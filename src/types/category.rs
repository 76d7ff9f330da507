//! Coarse type categories, expected-type tags, and information features.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type names (lowercase) admitted by each non-`all` category.
/// A declared type matches when it equals one of these or starts with one.
const NUMBER_TYPES: &[&str] = &[
    "int", "integer", "bigint", "smallint", "tinyint", "real", "float", "double", "numeric",
    "decimal",
];
const STRING_TYPES: &[&str] = &[
    "varchar", "char", "text", "nvarchar", "nchar", "clob", "blob", "string",
];
const DATE_TYPES: &[&str] = &["date", "datetime", "timestamp", "time"];
const BOOLEAN_TYPES: &[&str] = &["bool", "boolean", "bit"];

/// Coarse semantic type used to filter candidate columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    Number,
    String,
    Date,
    Boolean,
    /// No filter.
    All,
}

impl TypeCategory {
    /// Returns the category tag as written in templates.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TypeCategory::Number => "number",
            TypeCategory::String => "string",
            TypeCategory::Date => "date",
            TypeCategory::Boolean => "boolean",
            TypeCategory::All => "all",
        }
    }

    /// Parses a category tag.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "number" => Some(TypeCategory::Number),
            "string" => Some(TypeCategory::String),
            "date" => Some(TypeCategory::Date),
            "boolean" => Some(TypeCategory::Boolean),
            "all" => Some(TypeCategory::All),
            _ => None,
        }
    }

    /// Declared type patterns for this category, `None` for `all`.
    #[must_use]
    pub fn patterns(&self) -> Option<&'static [&'static str]> {
        match self {
            TypeCategory::Number => Some(NUMBER_TYPES),
            TypeCategory::String => Some(STRING_TYPES),
            TypeCategory::Date => Some(DATE_TYPES),
            TypeCategory::Boolean => Some(BOOLEAN_TYPES),
            TypeCategory::All => None,
        }
    }

    /// Returns true if a declared column type belongs to this category.
    ///
    /// Matching is case-insensitive, exact or by prefix, so `INT(11)` is a number and
    /// `VARCHAR(255)` a string.
    #[must_use]
    pub fn matches(&self, declared_type: &str) -> bool {
        let Some(patterns) = self.patterns() else {
            return true;
        };
        let declared = declared_type.to_lowercase();
        patterns.iter().any(|p| declared.starts_with(p))
    }

    /// Classifies a declared type into its category.
    ///
    /// The base name (before any `(`) is looked up exactly first. Failing
    /// that, a pattern may prefix it only when no letter follows, so
    /// `int unsigned` is a number but `interval` is not. Anything else is `All`.
    #[must_use]
    pub fn of_declared(declared_type: &str) -> Self {
        const ORDER: [TypeCategory; 4] = [
            TypeCategory::Number,
            TypeCategory::Date,
            TypeCategory::String,
            TypeCategory::Boolean,
        ];
        let declared = declared_type.to_lowercase();
        let base = declared.split('(').next().unwrap_or_default().trim();
        ORDER
            .into_iter()
            .find(|c| c.patterns().unwrap_or_default().iter().any(|p| *p == base))
            .or_else(|| ORDER.into_iter().find(|c| c.prefixes_word(base)))
            .unwrap_or(TypeCategory::All)
    }

    fn prefixes_word(&self, base: &str) -> bool {
        self.patterns().unwrap_or_default().iter().any(|p| {
            base.strip_prefix(*p)
                .is_some_and(|rest| !rest.starts_with(char::is_alphabetic))
        })
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Free-form literal generators usable in any template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    Hex,
    Time,
    Character,
    Date,
}

impl LiteralKind {
    /// All generators, in the order they are resolved.
    pub const ALL: [LiteralKind; 6] = [
        LiteralKind::Integer,
        LiteralKind::Float,
        LiteralKind::Hex,
        LiteralKind::Time,
        LiteralKind::Character,
        LiteralKind::Date,
    ];

    /// The marker text, e.g. `$int$`.
    #[must_use]
    pub fn marker(&self) -> &'static str {
        match self {
            LiteralKind::Integer => "$int$",
            LiteralKind::Float => "$float$",
            LiteralKind::Hex => "$hex$",
            LiteralKind::Time => "$time$",
            LiteralKind::Character => "$character$",
            LiteralKind::Date => "$date$",
        }
    }

    /// The expected-type tag consumed when this generator is resolved.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            LiteralKind::Integer => "integer",
            LiteralKind::Float => "float",
            LiteralKind::Hex => "hex",
            LiteralKind::Time => "time",
            LiteralKind::Character => "character",
            LiteralKind::Date => "date",
        }
    }

    /// Returns true for generators whose output is text rather than a number.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            LiteralKind::Time | LiteralKind::Character | LiteralKind::Date
        )
    }
}

/// Expected-type tag aligned to one placeholder of a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpectedType {
    /// A column type category (`number`, `string`, `date`, `boolean`, `all`).
    Category(TypeCategory),
    /// Tag carried by `$table_N$` placeholders; never filters columns.
    Table,
    /// Tag of a literal generator (`integer`, `float`, ...). `date` parses as a category.
    Literal(LiteralKind),
    /// Any other tag, kept verbatim. Matches no column.
    Other(String),
}

impl ExpectedType {
    /// The unconstrained tag.
    pub const ALL: ExpectedType = ExpectedType::Category(TypeCategory::All);

    /// Parses a tag string.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        if let Some(category) = TypeCategory::from_name(tag) {
            return ExpectedType::Category(category);
        }
        match tag {
            "table" => ExpectedType::Table,
            "integer" => ExpectedType::Literal(LiteralKind::Integer),
            "float" => ExpectedType::Literal(LiteralKind::Float),
            "hex" => ExpectedType::Literal(LiteralKind::Hex),
            "time" => ExpectedType::Literal(LiteralKind::Time),
            "character" => ExpectedType::Literal(LiteralKind::Character),
            other => ExpectedType::Other(other.to_string()),
        }
    }

    /// The tag string.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            ExpectedType::Category(c) => c.name(),
            ExpectedType::Table => "table",
            ExpectedType::Literal(k) => k.tag(),
            ExpectedType::Other(s) => s,
        }
    }

    /// Returns true for the `all` tag.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, ExpectedType::Category(TypeCategory::All))
    }

    /// Returns true if a column with this declared type satisfies the tag.
    #[must_use]
    pub fn admits(&self, declared_type: &str) -> bool {
        match self {
            ExpectedType::Category(c) => c.matches(declared_type),
            ExpectedType::Table => true,
            ExpectedType::Literal(_) | ExpectedType::Other(_) => false,
        }
    }
}

impl From<String> for ExpectedType {
    fn from(tag: String) -> Self {
        ExpectedType::parse(&tag)
    }
}

impl From<&str> for ExpectedType {
    fn from(tag: &str) -> Self {
        ExpectedType::parse(tag)
    }
}

impl From<ExpectedType> for String {
    fn from(t: ExpectedType) -> Self {
        t.tag().to_string()
    }
}

impl From<TypeCategory> for ExpectedType {
    fn from(c: TypeCategory) -> Self {
        ExpectedType::Category(c)
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How schema-aware a payload template is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InformationFeature {
    #[serde(rename = "constant")]
    Constant,
    #[serde(rename = "system-information", alias = "system information")]
    SystemInformation,
    #[serde(rename = "specific-database", alias = "specific database")]
    SpecificDatabase,
}

impl InformationFeature {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            InformationFeature::Constant => "constant",
            InformationFeature::SystemInformation => "system-information",
            InformationFeature::SpecificDatabase => "specific-database",
        }
    }
}

impl fmt::Display for InformationFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
