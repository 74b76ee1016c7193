//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record or document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Extraction or classification service error
    #[error(transparent)]
    Backend(#[from] citeline_backend::BackendError),

    /// Database or file storage error
    #[error(transparent)]
    Store(#[from] citeline_store::StoreError),

    /// Upload pipeline error
    #[error(transparent)]
    Extractor(#[from] citeline_extractor::ExtractorError),

    /// Classification backfill error
    #[error(transparent)]
    Backfill(#[from] citeline_backfill::BackfillError),

    /// Cell edit error
    #[error("Edit failed: {0}")]
    Edit(#[from] citeline_review::EditError),
}
