//! Error types for classification backfill

use thiserror::Error;

/// Errors that abort a backfill run
///
/// Per-record classification failures never show up here; they are
/// counted in [`crate::BackfillMetrics::failed`].
#[derive(Error, Debug)]
pub enum BackfillError {
    /// Repository read or write failed
    #[error("Storage error: {0}")]
    Store(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
