//! Citeline Backend Clients
//!
//! Implementations of the extraction and classification traits from
//! `citeline-domain`.
//!
//! # Clients
//!
//! - [`ExtractClient`]: HTTP document-extraction service (upload, then extract)
//! - [`OpenAiClassifier`]: chat-completion classifier for MasterFormat codes
//! - [`MockExtractionBackend`], [`MockClassifier`]: deterministic fakes for tests
//!
//! Clients are plain values. Build each once at startup and hand it to the
//! component that needs it.
//!
//! # Examples
//!
//! ```
//! use citeline_backend::MockClassifier;
//! use citeline_domain::traits::{ClassificationRequest, Classifier};
//!
//! # async fn example() {
//! let classifier = MockClassifier::new("09 51 00");
//! let request = ClassificationRequest {
//!     item_name: "Acoustic ceiling panel".to_string(),
//!     description: String::new(),
//!     manufacturer: "Armstrong".to_string(),
//!     allowed_sections: vec![],
//! };
//! assert_eq!(classifier.classify(&request).await.unwrap(), "09 51 00");
//! # }
//! ```

#![warn(missing_docs)]

pub mod extract;
pub mod mock;
pub mod openai;

use thiserror::Error;

pub use extract::ExtractClient;
pub use mock::{MockClassifier, MockExtractionBackend};
pub use openai::{normalize_classification_code, OpenAiClassifier};

/// Errors that can occur while talking to a backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Missing credential or invalid client settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Generic error
    #[error("Backend error: {0}")]
    Other(String),
}

/// Read a credential from the environment
///
/// A missing or blank variable is a configuration error naming the variable.
pub fn api_key_from_env(var: &str) -> Result<String, BackendError> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(BackendError::Configuration(format!(
            "API key not found. Set {} in your environment.",
            var
        ))),
    }
}
