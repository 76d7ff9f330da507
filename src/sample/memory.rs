//! In-memory relational store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::{Result, SynthError};
use crate::sample::{RelationalStore, SampleRequest, StoreConnection};
use crate::types::{Row, Value};

/// Relational store backed by rows held in memory.
///
/// Records every sample query it answers and tracks open connections, so
/// callers can verify quoting and release discipline.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// (database, table) -> rows.
    tables: HashMap<(String, String), Vec<Row>>,
    /// Scalar query text -> answer.
    scalars: HashMap<String, Value>,
    unreachable: bool,
    open: Cell<usize>,
    opened: Cell<usize>,
    log: RefCell<Vec<String>>,
}

impl MemoryStore {
    /// Creates an empty, reachable store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table's rows.
    #[must_use]
    pub fn with_table(
        mut self,
        database: impl Into<String>,
        table: impl Into<String>,
        rows: Vec<Row>,
    ) -> Self {
        self.tables.insert((database.into(), table.into()), rows);
        self
    }

    /// Adds the answer to a scalar query.
    #[must_use]
    pub fn with_scalar(mut self, sql: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scalars.insert(sql.into(), value.into());
        self
    }

    /// Makes every connection attempt fail.
    #[must_use]
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Connections currently open.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.open.get()
    }

    /// Connections opened over the store's lifetime.
    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.opened.get()
    }

    /// SQL text of every sample query answered so far.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl RelationalStore for MemoryStore {
    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>> {
        if self.unreachable {
            return Err(SynthError::StoreError("store is unreachable".into()));
        }
        self.open.set(self.open.get() + 1);
        self.opened.set(self.opened.get() + 1);
        Ok(Box::new(MemoryConnection { store: self }))
    }
}

struct MemoryConnection<'a> {
    store: &'a MemoryStore,
}

impl StoreConnection for MemoryConnection<'_> {
    fn select_sample(&mut self, request: &SampleRequest<'_>) -> Result<Vec<Row>> {
        let key = (request.database.to_string(), request.table.to_string());
        let rows = self.store.tables.get(&key).ok_or_else(|| {
            SynthError::StoreError(format!(
                "table '{}.{}' doesn't exist",
                request.database, request.table
            ))
        })?;
        self.store.log.borrow_mut().push(request.to_sql());
        Ok(rows
            .iter()
            .take(request.limit)
            .map(|r| r.project(request.columns))
            .collect())
    }

    fn query_scalar(&mut self, sql: &str) -> Result<Option<Value>> {
        Ok(self.store.scalars.get(sql).cloned())
    }
}

impl Drop for MemoryConnection<'_> {
    fn drop(&mut self) {
        self.store.open.set(self.store.open.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_released_on_drop() {
        let store = MemoryStore::new();
        {
            let _conn = store.connect().unwrap();
            assert_eq!(store.open_connections(), 1);
        }
        assert_eq!(store.open_connections(), 0);
    }

    #[test]
    fn test_scalar_lookup() {
        let store = MemoryStore::new().with_scalar("SELECT @@port", 3306_i64);
        let mut conn = store.connect().unwrap();
        assert_eq!(
            conn.query_scalar("SELECT @@port").unwrap(),
            Some(Value::Int64(3306))
        );
        assert_eq!(conn.query_scalar("SELECT 1").unwrap(), None);
    }
}
