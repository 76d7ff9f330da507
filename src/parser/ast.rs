//! Placeholder descriptors produced by the template parser.

use std::ops::Range;

use crate::types::ExpectedType;

/// Logical table id as written in a template (`N` in `$table_N$`).
pub type TableId = u32;

/// Logical column id within a table (`M` in `$column_tN_M$`).
pub type ColumnId = u32;

/// What a placeholder stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// `$table_N$`
    Table { table_id: TableId },
    /// `$column_tN_M$`
    Column {
        table_id: TableId,
        column_id: ColumnId,
    },
    /// `$sample_tN_M$`
    Sample {
        table_id: TableId,
        column_id: ColumnId,
    },
    /// Any other `$word$`; renders as its inner text.
    Unknown { content: String },
}

/// A typed placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// Byte span of the whole marker, sigils included, in the parsed template.
    pub span: Range<usize>,
    /// Type tag assigned after parsing; `all` until then.
    pub expected_type: ExpectedType,
}

impl Placeholder {
    #[must_use]
    pub fn new(kind: PlaceholderKind, span: Range<usize>) -> Self {
        Placeholder {
            kind,
            span,
            expected_type: ExpectedType::ALL,
        }
    }

    /// Table id for table, column, and sample placeholders.
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        match self.kind {
            PlaceholderKind::Table { table_id }
            | PlaceholderKind::Column { table_id, .. }
            | PlaceholderKind::Sample { table_id, .. } => Some(table_id),
            PlaceholderKind::Unknown { .. } => None,
        }
    }

    /// `(table_id, column_id)` for column and sample placeholders.
    #[must_use]
    pub fn column_ref(&self) -> Option<(TableId, ColumnId)> {
        match self.kind {
            PlaceholderKind::Column {
                table_id,
                column_id,
            }
            | PlaceholderKind::Sample {
                table_id,
                column_id,
            } => Some((table_id, column_id)),
            _ => None,
        }
    }

    /// Short kind label used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            PlaceholderKind::Table { .. } => "table",
            PlaceholderKind::Column { .. } => "column",
            PlaceholderKind::Sample { .. } => "sample",
            PlaceholderKind::Unknown { .. } => "unknown",
        }
    }

    /// Marker text as it appears in `template`.
    #[must_use]
    pub fn text<'a>(&self, template: &'a str) -> &'a str {
        &template[self.span.clone()]
    }
}
