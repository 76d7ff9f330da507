//! Natural-language comments appended to payloads.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Rhetorical style of an appended comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentStyle {
    /// Written for the payload by the [`CommentGenerator`].
    #[serde(rename = "Rational explanation")]
    RationalExplanation,
    #[serde(rename = "Irrelevant text dilution")]
    IrrelevantTextDilution,
    #[serde(rename = "Authoritative statement")]
    AuthoritativeStatement,
}

impl CommentStyle {
    pub const ALL: [CommentStyle; 3] = [
        CommentStyle::RationalExplanation,
        CommentStyle::IrrelevantTextDilution,
        CommentStyle::AuthoritativeStatement,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CommentStyle::RationalExplanation => "Rational explanation",
            CommentStyle::IrrelevantTextDilution => "Irrelevant text dilution",
            CommentStyle::AuthoritativeStatement => "Authoritative statement",
        }
    }
}

impl fmt::Display for CommentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stored comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    #[serde(rename = "type")]
    pub style: CommentStyle,
    pub comment: String,
}

/// Pre-written comments, drawn by style.
#[derive(Debug, Clone, Default)]
pub struct CommentRepository {
    entries: Vec<CommentEntry>,
}

impl CommentRepository {
    #[must_use]
    pub fn new(entries: Vec<CommentEntry>) -> Self {
        CommentRepository { entries }
    }

    /// Parses a JSON array of `{type, comment}` entries.
    ///
    /// # Errors
    ///
    /// Returns a `Json` error for malformed input or an unknown style.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A uniformly chosen comment of `style`, if any is stored.
    pub fn draw<R: Rng + ?Sized>(&self, style: CommentStyle, rng: &mut R) -> Option<&str> {
        let matching: Vec<&CommentEntry> =
            self.entries.iter().filter(|e| e.style == style).collect();
        matching.choose(rng).map(|e| e.comment.as_str())
    }
}

/// Text-generation collaborator that explains a payload in prose.
///
/// Calls are blocking and may fail; a failure costs the statement its
/// comment, never the statement itself.
pub trait CommentGenerator {
    /// Writes a comment for `payload`, rendered from `template` of kind `payload_type`.
    ///
    /// # Errors
    ///
    /// Returns a `CommentError` if the service cannot produce text.
    fn generate_comment(&self, payload_type: &str, template: &str, payload: &str)
        -> Result<String>;
}

impl<F> CommentGenerator for F
where
    F: Fn(&str, &str, &str) -> Result<String>,
{
    fn generate_comment(
        &self,
        payload_type: &str,
        template: &str,
        payload: &str,
    ) -> Result<String> {
        self(payload_type, template, payload)
    }
}

/// Payload details handed to comment sources.
#[derive(Debug, Clone, Copy)]
pub struct CommentRequest<'a> {
    pub payload_type: &'a str,
    pub template: &'a str,
    pub payload: &'a str,
}

/// Draws a style uniformly and produces a comment of that style.
///
/// Returns `None` when the repository has no entry of the drawn style, no
/// generator is configured, or the generator fails or returns blank text.
pub fn draw_comment<R: Rng + ?Sized>(
    repository: &CommentRepository,
    generator: Option<&dyn CommentGenerator>,
    request: &CommentRequest<'_>,
    rng: &mut R,
) -> Option<String> {
    let style = *CommentStyle::ALL.choose(rng)?;
    let comment = match style {
        CommentStyle::RationalExplanation => {
            let generator = generator?;
            match generator.generate_comment(request.payload_type, request.template, request.payload)
            {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(error = %e, payload_type = request.payload_type, "comment generation failed");
                    None
                }
            }
        }
        CommentStyle::IrrelevantTextDilution | CommentStyle::AuthoritativeStatement => {
            repository.draw(style, rng).map(str::to_string)
        }
    };

    let comment = comment.filter(|c| !c.trim().is_empty());
    debug!(%style, found = comment.is_some(), "comment drawn");
    comment
}
