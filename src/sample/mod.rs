//! Live value sampling through an external relational store.
//!
//! A [`RelationalStore`] hands out one [`StoreConnection`] per sampling
//! operation; the connection is released when it is dropped, on success and
//! failure paths alike. [`SampleProvider`] reduces a bounded row sample to one
//! representative literal per column and turns store failures into an explicit
//! [`ColumnSample::Unavailable`] marker instead of an error.

mod csv_store;
mod memory;

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::catalog::SchemaTable;
use crate::error::Result;
use crate::renderer::{Dialect, NULL_LITERAL};
use crate::types::{Row, Value};

pub use csv_store::CsvStore;
pub use memory::MemoryStore;

/// Default number of rows read per sampling operation.
pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// A read-only relational store the sampler can connect to.
pub trait RelationalStore {
    /// Opens a connection. The connection is closed when dropped.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store is unreachable.
    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>>;
}

/// An open connection to a [`RelationalStore`].
pub trait StoreConnection {
    /// Reads at most `request.limit` rows of the requested columns.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the query fails.
    fn select_sample(&mut self, request: &SampleRequest<'_>) -> Result<Vec<Row>>;

    /// Runs a query expected to yield one scalar; `None` for an empty result.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the query fails.
    fn query_scalar(&mut self, sql: &str) -> Result<Option<Value>>;
}

/// Parameters of one bounded sample read.
#[derive(Debug, Clone, Copy)]
pub struct SampleRequest<'a> {
    pub database: &'a str,
    pub table: &'a str,
    pub columns: &'a [String],
    pub limit: usize,
    pub dialect: Dialect,
}

impl SampleRequest<'_> {
    /// SQL text for SQL-speaking backends. Identifiers come from schema
    /// metadata and are always quoted.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| self.dialect.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let source = format!(
            "{}.{}",
            self.dialect.quote_identifier(self.database),
            self.dialect.quote_identifier(self.table)
        );
        match self.dialect {
            Dialect::SqlServer => format!("SELECT TOP {} {columns} FROM {source}", self.limit),
            Dialect::MySql | Dialect::Postgres => {
                format!("SELECT {columns} FROM {source} LIMIT {}", self.limit)
            }
        }
    }
}

/// Representative value chosen for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSample {
    /// A stringified non-null, non-empty value seen in the sample.
    Literal(String),
    /// The sample held no usable value for this column.
    Null,
    /// The store could not be read.
    Unavailable,
}

impl ColumnSample {
    /// The literal text, or the `NULL` sentinel.
    #[must_use]
    pub fn as_literal(&self) -> &str {
        match self {
            ColumnSample::Literal(v) => v,
            ColumnSample::Null | ColumnSample::Unavailable => NULL_LITERAL,
        }
    }
}

/// Per-column samples of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleMap {
    samples: HashMap<String, ColumnSample>,
    /// Store failure that made the whole map unavailable.
    failure: Option<String>,
}

impl SampleMap {
    /// Marks every column unavailable because of `reason`.
    #[must_use]
    pub fn unavailable(columns: &[String], reason: impl Into<String>) -> Self {
        SampleMap {
            samples: columns
                .iter()
                .map(|c| (c.clone(), ColumnSample::Unavailable))
                .collect(),
            failure: Some(reason.into()),
        }
    }

    /// Marks every column as having no usable value.
    #[must_use]
    pub fn all_null(columns: &[String]) -> Self {
        SampleMap {
            samples: columns
                .iter()
                .map(|c| (c.clone(), ColumnSample::Null))
                .collect(),
            failure: None,
        }
    }

    /// Sample for `column`; columns never requested read as `Null`.
    #[must_use]
    pub fn get(&self, column: &str) -> &ColumnSample {
        self.samples.get(column).unwrap_or(&ColumnSample::Null)
    }

    /// Literal text for `column`, or `NULL`.
    #[must_use]
    pub fn literal(&self, column: &str) -> &str {
        self.get(column).as_literal()
    }

    /// The store failure, if the sample could not be taken.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.failure.is_some()
    }
}

/// Fetches and reduces row samples for bound tables.
pub struct SampleProvider<'s> {
    store: &'s dyn RelationalStore,
    database: String,
    limit: usize,
    dialect: Dialect,
}

impl<'s> SampleProvider<'s> {
    #[must_use]
    pub fn new(store: &'s dyn RelationalStore, database: impl Into<String>) -> Self {
        SampleProvider {
            store,
            database: database.into(),
            limit: DEFAULT_SAMPLE_LIMIT,
            dialect: Dialect::default(),
        }
    }

    /// Sets the row limit of each sample read.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the identifier-quoting dialect of generated queries.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Samples every column of `table`. Never fails: store errors produce an
    /// unavailable map.
    pub fn fetch<R: Rng + ?Sized>(&self, table: &SchemaTable, rng: &mut R) -> SampleMap {
        let columns = table.column_names();
        match self.read_rows(&table.name, &columns) {
            Ok(rows) => reduce_rows(&columns, &rows, rng),
            Err(e) => {
                warn!(table = %table.name, error = %e, "sample read failed, using NULL samples");
                SampleMap::unavailable(&columns, e.to_string())
            }
        }
    }

    fn read_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Row>> {
        let mut conn = self.store.connect()?;
        let request = SampleRequest {
            database: &self.database,
            table,
            columns,
            limit: self.limit,
            dialect: self.dialect,
        };
        let rows = conn.select_sample(&request)?;
        debug!(table, rows = rows.len(), "sampled rows");
        Ok(rows)
    }

    /// Runs a scalar lookup on a fresh connection.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store is unreachable or the query fails.
    pub fn query_scalar(&self, sql: &str) -> Result<Option<Value>> {
        let mut conn = self.store.connect()?;
        conn.query_scalar(sql)
    }
}

/// Chooses one usable value per column, uniformly among the rows that have one.
fn reduce_rows<R: Rng + ?Sized>(columns: &[String], rows: &[Row], rng: &mut R) -> SampleMap {
    if rows.is_empty() {
        return SampleMap::all_null(columns);
    }
    let mut samples = HashMap::with_capacity(columns.len());
    for col in columns {
        let values: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|v| !v.is_blank())
            .map(Value::to_string)
            .collect();
        let sample = values
            .choose(rng)
            .map_or(ColumnSample::Null, |v| ColumnSample::Literal(v.clone()));
        samples.insert(col.clone(), sample);
    }
    SampleMap {
        samples,
        failure: None,
    }
}
