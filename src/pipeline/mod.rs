//! End-to-end synthesis of labeled injection statements.
//!
//! One [`Pipeline::synthesize`] call renders a payload template, optionally
//! appends a comment, splices the result into a host statement and labels it.
//! Every failure along the way yields `None` for that draw; a batch never
//! aborts.

mod comment;
mod difficulty;
mod record;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::catalog::SchemaCatalog;
use crate::config::GeneratorConfig;
use crate::error::{Result, SynthError};
use crate::renderer::{
    resolve_literals, LiteralStyle, SystemInformationRenderer, SystemVariable, TemplateRenderer,
};
use crate::sample::{RelationalStore, SampleProvider};
use crate::splice::{check, effective_text, splice};
use crate::types::InformationFeature;

pub use comment::{
    draw_comment, CommentEntry, CommentGenerator, CommentRepository, CommentRequest, CommentStyle,
};
pub use difficulty::{classify, Difficulty};
pub use record::{
    filter_split, load_host_statements, load_payload_templates, HasSplit, HostStatement,
    OutputRecord, PayloadTemplate, Split,
};

/// Synthesizes injection statements from host statements and payload templates.
pub struct Pipeline<'s> {
    store: &'s dyn RelationalStore,
    config: GeneratorConfig,
    /// Target database schemas, looked up by host statement `db`.
    schemas: Vec<SchemaCatalog>,
    /// System catalogs (e.g. `information_schema`) for table-bearing
    /// system-information templates.
    system_schemas: Vec<SchemaCatalog>,
    system_info: SystemInformationRenderer,
    comments: CommentRepository,
    generator: Option<&'s dyn CommentGenerator>,
}

impl<'s> Pipeline<'s> {
    #[must_use]
    pub fn new(store: &'s dyn RelationalStore, config: GeneratorConfig) -> Self {
        Pipeline {
            store,
            config,
            schemas: Vec::new(),
            system_schemas: Vec::new(),
            system_info: SystemInformationRenderer::default(),
            comments: CommentRepository::default(),
            generator: None,
        }
    }

    #[must_use]
    pub fn with_schemas(mut self, schemas: Vec<SchemaCatalog>) -> Self {
        self.schemas = schemas;
        self
    }

    #[must_use]
    pub fn with_system_schemas(mut self, schemas: Vec<SchemaCatalog>) -> Self {
        self.system_schemas = schemas;
        self
    }

    #[must_use]
    pub fn with_system_variables(mut self, variables: Vec<SystemVariable>) -> Self {
        self.system_info = SystemInformationRenderer::new(variables);
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: CommentRepository) -> Self {
        self.comments = comments;
        self
    }

    #[must_use]
    pub fn with_comment_generator(mut self, generator: &'s dyn CommentGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn schema(&self, database: &str) -> Option<&SchemaCatalog> {
        self.schemas.iter().find(|s| s.database_name() == database)
    }

    fn renderer<'a>(&'a self, catalog: &'a SchemaCatalog) -> TemplateRenderer<'a> {
        TemplateRenderer::new(catalog, self.store)
            .with_dialect(self.config.dialect)
            .with_sample_limit(self.config.sample_limit)
            .with_max_table_attempts(self.config.max_table_attempts)
    }

    /// Renders `template` for `host` without comment or splicing.
    ///
    /// Templates without expected types are used verbatim. Otherwise the
    /// information feature picks the renderer:
    /// - `specific-database`: the host's schema, bare table names
    /// - `system-information` with a `table` tag: a random system schema
    /// - `system-information` otherwise: system variables
    /// - `constant`: literal generators only
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` or `SchemaError` from schema-bound rendering.
    pub fn render_payload<R: Rng + ?Sized>(
        &self,
        host: &HostStatement,
        template: &PayloadTemplate,
        rng: &mut R,
    ) -> Result<String> {
        let Some(expected) = template.expected_types.as_deref() else {
            return Ok(template.payload.clone());
        };

        match template.information_feature {
            InformationFeature::SpecificDatabase => {
                let fallback;
                let catalog = if let Some(schema) = self.schema(&host.db) {
                    schema
                } else {
                    debug!(db = %host.db, "no schema for host database, rendering without tables");
                    fallback = SchemaCatalog::new(host.db.clone(), Vec::new())?;
                    &fallback
                };
                self.renderer(catalog).render(
                    &template.payload,
                    expected,
                    InformationFeature::SpecificDatabase,
                    rng,
                )
            }
            InformationFeature::SystemInformation if template.references_tables() => {
                let catalog = self.system_schemas.choose(rng).ok_or_else(|| {
                    SynthError::SchemaError("no system schemas configured".into())
                })?;
                self.renderer(catalog).render(
                    &template.payload,
                    expected,
                    InformationFeature::SystemInformation,
                    rng,
                )
            }
            InformationFeature::SystemInformation => {
                let provider = SampleProvider::new(self.store, host.db.clone())
                    .with_limit(self.config.sample_limit)
                    .with_dialect(self.config.dialect);
                Ok(self
                    .system_info
                    .render(&template.payload, expected, &provider, rng))
            }
            InformationFeature::Constant => {
                Ok(resolve_literals(&template.payload, LiteralStyle::Bare, rng).text)
            }
        }
    }

    /// Synthesizes one labeled statement, or `None` if this draw produced none.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        host: &HostStatement,
        template: &PayloadTemplate,
        rng: &mut R,
    ) -> Option<OutputRecord> {
        let rendered = match self.render_payload(host, template, rng) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(error = %e, payload = %template.payload, "payload rendering failed");
                return None;
            }
        };

        let mut payload = rendered.clone();
        let mut commented = false;
        if rng.gen::<f64>() < self.config.comment_rate {
            let request = CommentRequest {
                payload_type: &template.payload_type,
                template: &template.payload,
                payload: &rendered,
            };
            if let Some(comment) = draw_comment(&self.comments, self.generator, &request, rng) {
                payload.push_str(&comment);
                commented = true;
            }
        }

        let Some(host_sql) = host.sql.as_deref() else {
            debug!(db = %host.db, "host statement has no text");
            return None;
        };
        let Some(spliced) = splice(host_sql, &payload) else {
            warn!(sql = %host_sql, "host statement has no injection marker");
            return None;
        };

        let effective = effective_text(&spliced.sql);
        if let Err(imbalance) = check(effective) {
            warn!(sql = %effective, %imbalance, "spliced statement rejected");
            return None;
        }

        Some(OutputRecord {
            sql: spliced.sql,
            original_sql: host.clone(),
            payload_template: template.clone(),
            payload,
            label: false,
            comment: commented,
            difficulty: classify(host.annotator, commented, template.information_feature),
        })
    }

    /// Runs `count` independent draws, each pairing a uniformly chosen host
    /// statement with a uniformly chosen template.
    ///
    /// Returns one entry per draw; `None` marks a draw that produced nothing.
    pub fn generate_batch<R: Rng + ?Sized>(
        &self,
        count: usize,
        hosts: &[HostStatement],
        templates: &[PayloadTemplate],
        rng: &mut R,
    ) -> Vec<Option<OutputRecord>> {
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let record = match (hosts.choose(rng), templates.choose(rng)) {
                (Some(host), Some(template)) => self.synthesize(host, template, rng),
                _ => None,
            };
            records.push(record);
        }
        let produced = records.iter().filter(|r| r.is_some()).count();
        debug!(count, produced, "batch generated");
        records
    }
}
