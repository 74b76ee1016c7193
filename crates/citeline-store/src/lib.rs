//! Citeline Storage Layer
//!
//! Implements the repository and object-storage traits from
//! `citeline-domain`.
//!
//! # Architecture
//!
//! - [`SqliteStore`]: durable records, documents and viewed-record log
//! - [`MemoryStore`]: the same contract in process memory, for tests and dry runs
//! - [`FsStorage`]: uploaded PDFs on the local filesystem
//!
//! # Examples
//!
//! ```no_run
//! use citeline_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for record and document operations
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;
mod storage;

use citeline_domain::traits::RepositoryError;
use citeline_domain::DocumentStatus;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use storage::{unique_filename, FsStorage, STORAGE_PREFIX};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record or document not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Record or document id already present
    #[error("Duplicate id: {0}")]
    Duplicate(String),

    /// Document status change not allowed
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: DocumentStatus,
        /// Requested status
        to: DocumentStatus,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

impl RepositoryError for StoreError {
    fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
