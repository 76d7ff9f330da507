//! sqli-synth - Schema-aware SQL-injection statement synthesis
//!
//! Renders typed payload templates against real schema metadata and sampled
//! values, splices them into host statements with balance repair, and labels
//! the results for offline detection datasets.

pub mod binder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod renderer;
pub mod sample;
pub mod splice;
pub mod types;

pub use catalog::{load_schemas, ColumnDef, SchemaCatalog, SchemaTable};
pub use config::GeneratorConfig;
pub use error::{Result, SynthError};
pub use parser::{parse_placeholders, Placeholder, PlaceholderKind};
pub use pipeline::{
    classify, CommentGenerator, CommentRepository, Difficulty, HostStatement, OutputRecord,
    PayloadTemplate, Pipeline, Split,
};
pub use renderer::{Dialect, TemplateInput, TemplateRenderer, ValueFormatter};
pub use sample::{CsvStore, MemoryStore, RelationalStore, SampleProvider};
pub use splice::{check, insert, Imbalance};
pub use types::{ExpectedType, InformationFeature, Row, TypeCategory, Value};
