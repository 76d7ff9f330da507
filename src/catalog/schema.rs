//! Schema definitions for target databases.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::types::ExpectedType;

/// Schema document as exchanged on disk, one per database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(alias = "databaseName")]
    pub database_name: String,
    #[serde(default)]
    pub tables: Vec<TableDocument>,
}

/// Table entry of a [`SchemaDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDocument {
    #[serde(alias = "tableName")]
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDocument>,
}

/// Column entry of a [`TableDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDocument {
    #[serde(alias = "columnName")]
    pub column_name: String,
    #[serde(alias = "declaredType", alias = "declared_type")]
    pub data_type: String,
}

/// In-memory view of one database's tables, immutable once loaded.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    database_name: String,
    /// Tables in document order.
    tables: Vec<SchemaTable>,
    /// Table name -> position in `tables`.
    index: HashMap<String, usize>,
}

impl SchemaCatalog {
    /// Builds a catalog from a schema document.
    ///
    /// # Errors
    ///
    /// Returns an error if a table name repeats or a table fails validation.
    pub fn from_document(doc: SchemaDocument) -> Result<Self> {
        let mut tables = Vec::with_capacity(doc.tables.len());
        for table in doc.tables {
            let columns = table
                .columns
                .into_iter()
                .map(|c| ColumnDef::new(c.column_name, c.data_type))
                .collect::<Result<Vec<_>>>()?;
            tables.push(SchemaTable::new(table.table_name, columns)?);
        }
        Self::new(doc.database_name, tables)
    }

    /// Creates a catalog from already-validated tables.
    ///
    /// # Errors
    ///
    /// Returns an error if two tables share a name.
    pub fn new(database_name: impl Into<String>, tables: Vec<SchemaTable>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tables.len());
        for (i, table) in tables.iter().enumerate() {
            if index.insert(table.name.clone(), i).is_some() {
                return Err(SynthError::SchemaError(format!(
                    "Table '{}' already exists",
                    table.name
                )));
            }
        }
        Ok(SchemaCatalog {
            database_name: database_name.into(),
            tables,
            index,
        })
    }

    /// Parses a single schema document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the schema is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SchemaDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Name of the database this catalog describes.
    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// All tables in document order.
    #[must_use]
    pub fn tables(&self) -> &[SchemaTable] {
        &self.tables
    }

    /// Retrieves a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&SchemaTable> {
        self.index.get(name).map(|&i| &self.tables[i])
    }

    /// Checks if a table exists in the catalog.
    #[must_use]
    pub fn table_exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns all table names in document order.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the catalog has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Parses a JSON array of schema documents, e.g. one per target database.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or any schema is invalid.
pub fn load_schemas(json: &str) -> Result<Vec<SchemaCatalog>> {
    let docs: Vec<SchemaDocument> = serde_json::from_str(json)?;
    docs.into_iter().map(SchemaCatalog::from_document).collect()
}

/// Schema definition for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTable {
    /// Table name.
    pub name: String,
    /// Ordered list of column definitions.
    pub columns: Vec<ColumnDef>,
}

impl SchemaTable {
    /// Creates a new table schema with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the table has no columns or a column name repeats.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self> {
        let table = SchemaTable {
            name: name.into(),
            columns,
        };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(SynthError::SchemaError(format!(
                "Table '{}' must have at least one column",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for col in &self.columns {
            if !seen.insert(&col.name) {
                return Err(SynthError::SchemaError(format!(
                    "Duplicate column name '{}' in table '{}'",
                    col.name, self.name
                )));
            }
        }

        Ok(())
    }

    /// Finds a column definition by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Columns whose declared type satisfies `expected`.
    #[must_use]
    pub fn columns_matching(&self, expected: &ExpectedType) -> Vec<&ColumnDef> {
        self.columns
            .iter()
            .filter(|c| expected.admits(&c.declared_type))
            .collect()
    }
}

/// Definition of a single column in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared database type, verbatim (e.g. `varchar(255)`).
    pub declared_type: String,
}

impl ColumnDef {
    /// Creates a new column definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the column name is empty.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SynthError::SchemaError("Column name cannot be empty".into()));
        }
        Ok(ColumnDef {
            name,
            declared_type: declared_type.into(),
        })
    }
}
