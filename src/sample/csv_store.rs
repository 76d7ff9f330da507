//! Relational store over CSV table dumps.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Result, SynthError};
use crate::sample::{RelationalStore, SampleRequest, StoreConnection};
use crate::types::{Row, Value};

/// Store that reads `<root>/<database>/<table>.csv`, one header row per file.
///
/// Useful for offline dataset builds from table dumps. It cannot answer
/// scalar queries.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
    delimiter: u8,
}

impl CsvStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CsvStore {
            root: root.into(),
            delimiter: b',',
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Path of the dump for `database.table`.
    #[must_use]
    pub fn table_path(&self, database: &str, table: &str) -> PathBuf {
        self.root.join(database).join(format!("{table}.csv"))
    }
}

impl RelationalStore for CsvStore {
    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>> {
        if !self.root.is_dir() {
            return Err(SynthError::StoreError(format!(
                "CSV store root '{}' is not a directory",
                self.root.display()
            )));
        }
        Ok(Box::new(CsvConnection { store: self }))
    }
}

struct CsvConnection<'a> {
    store: &'a CsvStore,
}

impl CsvConnection<'_> {
    fn reader_from_path(&self, path: &Path) -> Result<csv::Reader<File>> {
        let file = File::open(path)?;
        Ok(csv::ReaderBuilder::new()
            .delimiter(self.store.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file))
    }
}

impl StoreConnection for CsvConnection<'_> {
    fn select_sample(&mut self, request: &SampleRequest<'_>) -> Result<Vec<Row>> {
        let path = self.store.table_path(request.database, request.table);
        let mut reader = self.reader_from_path(&path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for result in reader.records().take(request.limit) {
            let record = result?;
            let mut row = Row::new();
            for (name, field) in headers.iter().zip(record.iter()) {
                if request.columns.contains(name) {
                    row.set(name.clone(), Value::from_text(field));
                }
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn query_scalar(&mut self, sql: &str) -> Result<Option<Value>> {
        Err(SynthError::StoreError(format!(
            "CSV store cannot run scalar query '{sql}'"
        )))
    }
}
