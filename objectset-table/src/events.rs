//! Observability events emitted by the edit protocol.

use chrono::{DateTime, Utc};

use crate::state::CellIndex;

/// Kind of table event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableEventKind {
    /// A cell entered edit mode.
    EditingStart,
    /// A cell value was committed.
    EditingSave,
    /// A cell left edit mode, saved or not.
    EditingExit,
    /// Validation or saving rejected the pending value.
    ValidationError,
    /// The pending value passed validation.
    ValidationSuccess,
    /// The row error list changed.
    ValidationErrorChange,
}

impl TableEventKind {
    /// Event name, e.g. `"editing-start"`.
    pub fn name(self) -> &'static str {
        match self {
            TableEventKind::EditingStart => "editing-start",
            TableEventKind::EditingSave => "editing-save",
            TableEventKind::EditingExit => "editing-exit",
            TableEventKind::ValidationError => "validation-error",
            TableEventKind::ValidationSuccess => "validation-success",
            TableEventKind::ValidationErrorChange => "validation-error-change",
        }
    }
}

/// Event broadcast to table subscribers. Events cannot be cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEvent {
    pub kind: TableEventKind,
    pub timestamp: DateTime<Utc>,
    pub row: usize,
    pub column: usize,
    /// Field key of the column.
    pub field: String,
    /// Current row errors. Empty unless the event is about validation.
    pub errors: Vec<String>,
}

impl TableEvent {
    pub fn new(kind: TableEventKind, cell: CellIndex, field: impl Into<String>) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            row: cell.row,
            column: cell.column,
            field: field.into(),
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    pub fn cell(&self) -> CellIndex {
        CellIndex::new(self.row, self.column)
    }
}
