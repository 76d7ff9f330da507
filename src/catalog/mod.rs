//! Catalog of target database schemas.

mod schema;

pub use schema::{
    load_schemas, ColumnDef, ColumnDocument, SchemaCatalog, SchemaDocument, SchemaTable,
    TableDocument,
};
