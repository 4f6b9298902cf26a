//! Error types.

use std::time::Duration;

use thiserror::Error;

/// Errors signalled to callers that misuse the table API.
///
/// Validation failures are never reported through this type; they end up in
/// `TableState::selected_row_errors` instead.
#[derive(Debug, Error)]
pub enum TableError {
    /// A private accessor was requested through the public handle.
    #[error("'{0}' is private to the table and cannot be accessed through the public API")]
    PrivateAccess(String),

    /// The name does not belong to the public API surface.
    #[error("'{0}' is not part of the public table API")]
    UnknownMethod(String),

    /// Two columns share the same `field` key.
    #[error("Duplicate column field '{0}'")]
    DuplicateField(String),

    /// A column names a validator the registry does not know.
    #[error("Column '{field}' uses unknown validator '{name}'")]
    UnknownValidator {
        /// Column field key.
        field: String,
        /// Validator name.
        name: String,
    },

    /// A column index outside the column list.
    #[error("Column index {index} out of range ({count} columns)")]
    ColumnOutOfRange {
        /// Requested column.
        index: usize,
        /// Number of columns.
        count: usize,
    },

    /// Table options could not be parsed.
    #[error("Invalid table options: {0}")]
    Options(#[from] serde_json::Error),
}

/// Failure reported while persisting a committed cell value.
#[derive(Debug, Clone, Error)]
pub enum SaveError {
    /// The save handler declined the value.
    #[error("The value was rejected")]
    Rejected,

    /// The save handler failed.
    #[error("Saving failed: {0}")]
    Failed(String),

    /// The save handler did not finish in time.
    #[error("Saving timed out after {0:?}")]
    TimedOut(Duration),
}

impl SaveError {
    /// Create a failure from any displayable error.
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}
