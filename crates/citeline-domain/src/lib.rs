//! Citeline Domain Layer
//!
//! This crate contains the core data model for Citeline: product records
//! extracted from architectural PDFs, and the citations that tie every
//! extracted value back to a page and bounding box in its source document.
//!
//! ## Key Concepts
//!
//! - **Citation**: a pointer from a value to the page, box and block that justify it
//! - **Cited field**: a value paired with zero or more citations
//! - **Record**: one extracted product, composed of a closed set of cited fields
//! - **Document**: one uploaded PDF and its processing status
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture:
//! - Pure data and invariants only, no I/O
//! - Trait definitions for every external collaborator (repository,
//!   extraction backend, classification backend, object storage)
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod citation;
pub mod document;
pub mod id;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use citation::{
    citations_of, BlockType, BoundingBox, Citation, CitedField, Confidence, GranularConfidence,
    ParentBlock, NOT_AVAILABLE,
};
pub use document::{Document, DocumentDraft, DocumentStatus, DocumentType};
pub use id::{DocumentId, RecordId};
pub use record::{FieldKey, Record, RecordDraft, RecordPatch};

/// Current timestamp in seconds since Unix epoch
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
