//! Edit protocol error types

use citeline_domain::RecordId;
use thiserror::Error;

/// Errors raised by the cell edit protocol
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Editing was requested on a row that is not selected
    #[error("Row is not selected")]
    NotSelected,

    /// Draft change or confirm without an active edit
    #[error("Cell is not being edited")]
    NotEditing,

    /// Editor bound to one record was handed another
    #[error("Editor is bound to record {expected}, got {found}")]
    RecordMismatch {
        /// Record the editor was opened on
        expected: RecordId,
        /// Record passed in
        found: RecordId,
    },

    /// The repository write failed; the draft is kept
    #[error("Save failed: {0}")]
    Repository(String),
}
