//! Difficulty labels for synthesized statements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::InformationFeature;

/// How hard a synthesized statement is to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Simple,
    Medium,
    Hard,
    /// Unannotated host, commented payload, specific-database template.
    Undefined,
}

impl Difficulty {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Simple => "simple",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Labels a statement from its host annotation flag, comment flag and the
/// template's information feature.
#[must_use]
pub fn classify(annotated: bool, commented: bool, feature: InformationFeature) -> Difficulty {
    match (annotated, commented, feature) {
        (_, _, InformationFeature::Constant) => Difficulty::Simple,
        (_, _, InformationFeature::SystemInformation) | (true, false, _) => Difficulty::Medium,
        (true, true, _) | (false, false, _) => Difficulty::Hard,
        (false, true, InformationFeature::SpecificDatabase) => Difficulty::Undefined,
    }
}
