//! Error types for sqli-synth operations.

use thiserror::Error;

/// Result type alias using [`SynthError`].
pub type Result<T> = std::result::Result<T, SynthError>;

/// Error types for template rendering and statement synthesis.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Parse error with location information.
    #[error("Parse error at line {line}, column {col}: {message}")]
    ParseError {
        line: usize,
        col: usize,
        message: String,
    },

    /// Schema-related errors (empty schema, duplicate table, column-less table, etc.).
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Relational store connectivity or query failure.
    #[error("Store error: {0}")]
    StoreError(String),

    /// Text-generation collaborator failure.
    #[error("Comment error: {0}")]
    CommentError(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
