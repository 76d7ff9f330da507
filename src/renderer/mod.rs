//! Template rendering.
//!
//! [`TemplateRenderer`] turns a payload template into concrete SQL text:
//! literal generators first, then placeholder parsing, type alignment, table
//! and column binding, sampling, and finally back-to-front substitution so
//! recorded spans stay valid while replacements change length.

mod format;
mod literals;
mod system_info;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binder::{assign_expected_types, BindingSet, TableBinder, DEFAULT_MAX_TABLE_ATTEMPTS};
use crate::catalog::SchemaCatalog;
use crate::error::Result;
use crate::parser::{parse_placeholders, Placeholder, PlaceholderKind};
use crate::sample::{RelationalStore, SampleProvider};
use crate::types::{ExpectedType, InformationFeature};

pub use format::{looks_numeric, quote_string, Dialect, ValueFormatter, NULL_LITERAL};
pub use literals::{
    consume_literal_tags, generate as generate_literal, resolve_literals, LiteralResolution,
    LiteralStyle,
};
pub use system_info::{SystemInformationRenderer, SystemVariable, SAMPLE_MARKER, SYSINFO_MARKER};

const UNKNOWN_TABLE: &str = "unknown_table";
const UNKNOWN_COLUMN: &str = "unknown_column";

/// How `$table_N$` placeholders are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableNaming {
    /// `table`
    Bare,
    /// `database.table`
    Qualified,
}

impl From<InformationFeature> for TableNaming {
    fn from(feature: InformationFeature) -> Self {
        match feature {
            InformationFeature::SpecificDatabase => TableNaming::Bare,
            InformationFeature::Constant | InformationFeature::SystemInformation => {
                TableNaming::Qualified
            }
        }
    }
}

/// A payload template: bare text, or text with type tags and a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateInput {
    Raw(String),
    Structured {
        payload: String,
        #[serde(default)]
        expected_types: Vec<ExpectedType>,
        #[serde(rename = "information_features")]
        information_feature: InformationFeature,
    },
}

impl TemplateInput {
    #[must_use]
    pub fn payload(&self) -> &str {
        match self {
            TemplateInput::Raw(text) => text,
            TemplateInput::Structured { payload, .. } => payload,
        }
    }
}

/// Renders payload templates against one schema catalog.
pub struct TemplateRenderer<'a> {
    catalog: &'a SchemaCatalog,
    provider: SampleProvider<'a>,
    dialect: Dialect,
    max_table_attempts: usize,
}

impl<'a> TemplateRenderer<'a> {
    /// Creates a renderer sampling `catalog`'s database through `store`.
    #[must_use]
    pub fn new(catalog: &'a SchemaCatalog, store: &'a dyn RelationalStore) -> Self {
        TemplateRenderer {
            catalog,
            provider: SampleProvider::new(store, catalog.database_name()),
            dialect: Dialect::default(),
            max_table_attempts: DEFAULT_MAX_TABLE_ATTEMPTS,
        }
    }

    /// Sets the identifier-quoting dialect for column names and sample queries.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self.provider = self.provider.with_dialect(dialect);
        self
    }

    /// Sets the row limit of sample reads.
    #[must_use]
    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.provider = self.provider.with_limit(limit);
        self
    }

    /// Sets the draw budget per table id.
    #[must_use]
    pub fn with_max_table_attempts(mut self, attempts: usize) -> Self {
        self.max_table_attempts = attempts;
        self
    }

    /// Renders `template` with tags aligned to its placeholders.
    ///
    /// Table placeholders are bare for `specific-database` templates and
    /// qualified with the database name otherwise.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the template cannot be tokenized, or a
    /// `SchemaError` if it references tables but the catalog has none.
    pub fn render<R: Rng + ?Sized>(
        &self,
        template: &str,
        expected_types: &[ExpectedType],
        feature: InformationFeature,
        rng: &mut R,
    ) -> Result<String> {
        self.render_with(template, expected_types, TableNaming::from(feature), rng)
    }

    /// Renders a raw or structured template. Raw text has no type tags and
    /// uses qualified table names.
    ///
    /// # Errors
    ///
    /// See [`TemplateRenderer::render`].
    pub fn render_input<R: Rng + ?Sized>(
        &self,
        input: &TemplateInput,
        rng: &mut R,
    ) -> Result<String> {
        match input {
            TemplateInput::Raw(text) => self.render_with(text, &[], TableNaming::Qualified, rng),
            TemplateInput::Structured {
                payload,
                expected_types,
                information_feature,
            } => self.render(payload, expected_types, *information_feature, rng),
        }
    }

    fn render_with<R: Rng + ?Sized>(
        &self,
        template: &str,
        expected_types: &[ExpectedType],
        naming: TableNaming,
        rng: &mut R,
    ) -> Result<String> {
        let literals = resolve_literals(template, LiteralStyle::Bare, rng);
        let mut expected = expected_types.to_vec();
        consume_literal_tags(&mut expected, &literals.resolved);
        let text = literals.text;

        let mut placeholders = parse_placeholders(&text)?;
        assign_expected_types(&mut placeholders, &expected, &text);

        let mut bindings = TableBinder::new(self.catalog)
            .with_max_attempts(self.max_table_attempts)
            .bind(&placeholders, rng)?;

        // Resolve in text order so memoized choices follow first occurrence.
        let values: Vec<String> = placeholders
            .iter()
            .map(|p| self.replacement(p, &mut bindings, naming, rng))
            .collect();

        let mut rendered = text.clone();
        for (placeholder, value) in placeholders.iter().zip(&values).rev() {
            rendered.replace_range(placeholder.span.clone(), value);
        }
        debug!(template = %text, rendered = %rendered, "template rendered");
        Ok(rendered)
    }

    fn replacement<R: Rng + ?Sized>(
        &self,
        placeholder: &Placeholder,
        bindings: &mut BindingSet<'a>,
        naming: TableNaming,
        rng: &mut R,
    ) -> String {
        match &placeholder.kind {
            PlaceholderKind::Table { table_id } => match bindings.get(*table_id) {
                Some(binding) => match naming {
                    TableNaming::Bare => binding.table_name().to_string(),
                    TableNaming::Qualified => {
                        format!("{}.{}", self.catalog.database_name(), binding.table_name())
                    }
                },
                None => UNKNOWN_TABLE.to_string(),
            },
            PlaceholderKind::Column {
                table_id,
                column_id,
            } => match bindings
                .get_mut(*table_id)
                .and_then(|binding| binding.resolve_column(*column_id, rng))
            {
                Some(column) => self.dialect.column_reference(&column.name),
                None => UNKNOWN_COLUMN.to_string(),
            },
            PlaceholderKind::Sample {
                table_id,
                column_id,
            } => match bindings.get_mut(*table_id) {
                Some(binding) => match binding.resolve_column(*column_id, rng) {
                    Some(column) => {
                        let samples = binding.samples(&self.provider, rng);
                        ValueFormatter::format(samples.literal(&column.name), &column.declared_type)
                    }
                    None => NULL_LITERAL.to_string(),
                },
                None => NULL_LITERAL.to_string(),
            },
            PlaceholderKind::Unknown { content } => content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, SchemaTable};
    use crate::sample::MemoryStore;
    use crate::types::Row;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new(
            "shop",
            vec![SchemaTable::new(
                "users",
                vec![
                    ColumnDef::new("id", "int").unwrap(),
                    ColumnDef::new("full name", "varchar(64)").unwrap(),
                ],
            )
            .unwrap()],
        )
        .unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new().with_table(
            "shop",
            "users",
            vec![Row::new().with("id", 7_i64).with("full name", "O'Neil")],
        )
    }

    fn tags(names: &[&str]) -> Vec<ExpectedType> {
        names.iter().map(|n| ExpectedType::parse(n)).collect()
    }

    #[test]
    fn test_render_specific_database() {
        let cat = catalog();
        let store = store();
        let renderer = TemplateRenderer::new(&cat, &store);
        let out = renderer
            .render(
                "' UNION SELECT $column_t1_1$ FROM $table_1$ WHERE $column_t1_1$=$sample_t1_1$ --",
                &tags(&["string", "table", "string", "string"]),
                InformationFeature::SpecificDatabase,
                &mut ChaCha8Rng::seed_from_u64(8),
            )
            .unwrap();
        assert_eq!(
            out,
            "' UNION SELECT `full name` FROM users WHERE `full name`='O''Neil' --"
        );
    }

    #[test]
    fn test_qualified_table_names() {
        let cat = catalog();
        let store = store();
        let renderer = TemplateRenderer::new(&cat, &store);
        let out = renderer
            .render(
                "$table_1$",
                &[],
                InformationFeature::SystemInformation,
                &mut StepRng::new(0, 0),
            )
            .unwrap();
        assert_eq!(out, "shop.users");
    }

    #[test]
    fn test_number_sample_is_bare() {
        let cat = catalog();
        let store = store();
        let out = TemplateRenderer::new(&cat, &store)
            .render(
                "$column_t1_1$=$sample_t1_1$",
                &tags(&["number", "number"]),
                InformationFeature::SpecificDatabase,
                &mut ChaCha8Rng::seed_from_u64(3),
            )
            .unwrap();
        assert_eq!(out, "id=7");
    }

    #[test]
    fn test_unknown_placeholders_pass_through() {
        let cat = catalog();
        let store = store();
        let out = TemplateRenderer::new(&cat, &store)
            .render(
                "' OR $foo$ --",
                &[],
                InformationFeature::Constant,
                &mut StepRng::new(0, 0),
            )
            .unwrap();
        assert_eq!(out, "' OR foo --");
    }

    #[test]
    fn test_table_id_zero_is_unknown() {
        let cat = catalog();
        let store = store();
        let out = TemplateRenderer::new(&cat, &store)
            .render(
                "$table_0$ $column_t0_1$ $sample_t0_1$",
                &[],
                InformationFeature::SpecificDatabase,
                &mut StepRng::new(0, 0),
            )
            .unwrap();
        assert_eq!(out, "unknown_table unknown_column NULL");
    }

    #[test]
    fn test_literal_tags_consumed_before_alignment() {
        let cat = catalog();
        let store = store();
        let out = TemplateRenderer::new(&cat, &store)
            .render(
                "$int$ $column_t1_1$",
                &tags(&["integer", "number"]),
                InformationFeature::SpecificDatabase,
                &mut ChaCha8Rng::seed_from_u64(5),
            )
            .unwrap();
        let (n, col) = out.split_once(' ').unwrap();
        assert!(n.parse::<u32>().unwrap() <= 100);
        assert_eq!(col, "id");
    }

    #[test]
    fn test_unreachable_store_samples_null() {
        let cat = catalog();
        let store = MemoryStore::new().unreachable();
        let out = TemplateRenderer::new(&cat, &store)
            .render(
                "$sample_t1_1$",
                &tags(&["string"]),
                InformationFeature::SpecificDatabase,
                &mut StepRng::new(0, 0),
            )
            .unwrap();
        assert_eq!(out, "NULL");
    }

    #[test]
    fn test_template_input_forms() {
        let raw: TemplateInput = serde_json::from_str(r#""$table_1$""#).unwrap();
        assert_eq!(raw, TemplateInput::Raw("$table_1$".into()));

        let structured: TemplateInput = serde_json::from_str(
            r#"{"payload": "$table_1$", "expected_types": ["table"],
                "information_features": "specific database"}"#,
        )
        .unwrap();
        assert_eq!(structured.payload(), "$table_1$");

        let cat = catalog();
        let store = store();
        let renderer = TemplateRenderer::new(&cat, &store);
        let mut rng = StepRng::new(0, 0);
        assert_eq!(renderer.render_input(&raw, &mut rng).unwrap(), "shop.users");
        assert_eq!(renderer.render_input(&structured, &mut rng).unwrap(), "users");
    }
}
