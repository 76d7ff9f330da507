//! Dataset records: host statements, payload templates, and output records.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::difficulty::Difficulty;
use crate::types::{ExpectedType, InformationFeature};

/// Dataset partition a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

/// Records that carry a dataset partition.
pub trait HasSplit {
    fn split(&self) -> Option<Split>;
}

/// Items belonging to `split`, in input order.
#[must_use]
pub fn filter_split<T: HasSplit>(items: &[T], split: Split) -> Vec<&T> {
    items
        .iter()
        .filter(|item| item.split() == Some(split))
        .collect()
}

/// A benign statement with a marked injection point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatement {
    /// Statement text containing `$$`. Missing statements produce no record.
    pub sql: Option<String>,
    /// Name of the database the statement targets.
    pub db: String,
    /// True if the statement carries an annotation.
    #[serde(default)]
    pub annotator: bool,
    #[serde(default)]
    pub set: Option<Split>,
}

impl HostStatement {
    #[must_use]
    pub fn new(sql: impl Into<String>, db: impl Into<String>) -> Self {
        HostStatement {
            sql: Some(sql.into()),
            db: db.into(),
            annotator: false,
            set: None,
        }
    }

    #[must_use]
    pub fn with_annotator(mut self, annotator: bool) -> Self {
        self.annotator = annotator;
        self
    }

    #[must_use]
    pub fn with_split(mut self, split: Split) -> Self {
        self.set = Some(split);
        self
    }
}

impl HasSplit for HostStatement {
    fn split(&self) -> Option<Split> {
        self.set
    }
}

/// A parameterized injection payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadTemplate {
    pub payload: String,
    /// One tag per placeholder in text order. `None` means the payload is
    /// used verbatim.
    #[serde(default)]
    pub expected_types: Option<Vec<ExpectedType>>,
    #[serde(rename = "information_features")]
    pub information_feature: InformationFeature,
    /// Free-form attack kind, passed to the comment generator.
    #[serde(rename = "type", default)]
    pub payload_type: String,
    #[serde(default)]
    pub set: Option<Split>,
}

impl PayloadTemplate {
    #[must_use]
    pub fn new(payload: impl Into<String>, information_feature: InformationFeature) -> Self {
        PayloadTemplate {
            payload: payload.into(),
            expected_types: None,
            information_feature,
            payload_type: String::new(),
            set: None,
        }
    }

    /// Sets the expected-type tags.
    #[must_use]
    pub fn with_expected_types<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ExpectedType>,
    {
        self.expected_types = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_payload_type(mut self, payload_type: impl Into<String>) -> Self {
        self.payload_type = payload_type.into();
        self
    }

    #[must_use]
    pub fn with_split(mut self, split: Split) -> Self {
        self.set = Some(split);
        self
    }

    /// True if any expected-type tag is `table`.
    #[must_use]
    pub fn references_tables(&self) -> bool {
        self.expected_types
            .as_ref()
            .is_some_and(|tags| tags.contains(&ExpectedType::Table))
    }
}

impl HasSplit for PayloadTemplate {
    fn split(&self) -> Option<Split> {
        self.set
    }
}

/// A synthesized malicious statement with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub sql: String,
    pub original_sql: HostStatement,
    pub payload_template: PayloadTemplate,
    /// Rendered payload, comment included.
    pub payload: String,
    /// Always false: every synthesized statement is malicious.
    pub label: bool,
    /// True if a comment was appended.
    pub comment: bool,
    pub difficulty: Difficulty,
}

/// Parses a JSON array of host statements.
///
/// # Errors
///
/// Returns a `Json` error for malformed input.
pub fn load_host_statements(json: &str) -> Result<Vec<HostStatement>> {
    Ok(serde_json::from_str(json)?)
}

/// Parses a JSON array of payload templates.
///
/// # Errors
///
/// Returns a `Json` error for malformed input.
pub fn load_payload_templates(json: &str) -> Result<Vec<PayloadTemplate>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_template_null_expected_types() {
        let t: PayloadTemplate = serde_json::from_str(
            r#"{"payload": "' OR 1=1 --", "expected_types": null,
                "information_features": "constant", "type": "tautology", "set": "test"}"#,
        )
        .unwrap();
        assert_eq!(t.expected_types, None);
        assert_eq!(t.payload_type, "tautology");
        assert_eq!(t.set, Some(Split::Test));
        assert!(!t.references_tables());
    }

    #[test]
    fn test_references_tables() {
        let t = PayloadTemplate::new("$table_1$", InformationFeature::SystemInformation)
            .with_expected_types(["table"]);
        assert!(t.references_tables());
    }

    #[test]
    fn test_filter_split() {
        let hosts = vec![
            HostStatement::new("a=$$", "db").with_split(Split::Train),
            HostStatement::new("b=$$", "db").with_split(Split::Test),
            HostStatement::new("c=$$", "db"),
        ];
        let train = filter_split(&hosts, Split::Train);
        assert_eq!(train.len(), 1);
        assert_eq!(train[0].sql.as_deref(), Some("a=$$"));
        assert_eq!(filter_split(&hosts, Split::Test).len(), 1);
    }
}
