//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction and ingestion
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Extraction backend error (network, HTTP, credentials)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Repository error
    #[error("Store error: {0}")]
    Store(String),

    /// Object storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Extraction timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// Backend payload was not valid JSON
    #[error("Invalid extraction payload: {0}")]
    InvalidFormat(String),

    /// Backend queued the job instead of answering synchronously
    #[error("Synchronous extraction required, backend returned async job {0}")]
    AsyncJob(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::InvalidFormat(e.to_string())
    }
}
