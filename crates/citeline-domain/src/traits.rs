//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the domain and its
//! collaborators. Implementations live in other crates:
//! repositories in `citeline-store`, backends in `citeline-backend`.
//!
//! Repositories are synchronous and take `&mut self` for writes; callers
//! that share one across tasks wrap it in a mutex. Network-bound
//! collaborators return futures.

use crate::citation::CitedField;
use crate::document::{Document, DocumentDraft, DocumentStatus, DocumentType};
use crate::id::{DocumentId, RecordId};
use crate::record::{FieldKey, Record, RecordDraft, RecordPatch};
use std::future::Future;

/// Filter for listing or deleting records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Only records from this document
    pub document_id: Option<DocumentId>,
    /// Only records of this document type
    pub document_type: Option<DocumentType>,
}

impl RecordQuery {
    /// Records belonging to one document
    pub fn for_document(document_id: DocumentId) -> Self {
        Self {
            document_id: Some(document_id),
            ..Self::default()
        }
    }

    /// Whether a record satisfies every set criterion
    pub fn matches(&self, record: &Record) -> bool {
        self.document_id.is_none_or(|id| record.document_id == id)
            && self.document_type.is_none_or(|ty| record.document_type == ty)
    }
}

/// Errors a repository can report about a missing row
///
/// Lets generic code tell "not found" apart from other failures.
pub trait RepositoryError: std::error::Error {
    /// Whether this error means the id does not exist
    fn is_not_found(&self) -> bool;
}

/// Storage of product records
///
/// Implemented by the infrastructure layer (citeline-store)
pub trait RecordRepository {
    /// Error type for repository operations
    type Error: RepositoryError;

    /// Every record, in insertion order
    fn list_records(&self) -> Result<Vec<Record>, Self::Error>;

    /// Records matching a query, in insertion order
    fn list_records_where(&self, query: &RecordQuery) -> Result<Vec<Record>, Self::Error>;

    /// One record, or `None` if absent
    fn get_record(&self, id: RecordId) -> Result<Option<Record>, Self::Error>;

    /// Store fully formed records, preserving their ids
    fn insert_records(&mut self, records: Vec<Record>) -> Result<(), Self::Error>;

    /// Create a record from a draft, assigning id and timestamp
    fn create_record(&mut self, draft: RecordDraft) -> Result<Record, Self::Error> {
        let record = Record::from_draft(draft);
        self.insert_records(vec![record.clone()])?;
        Ok(record)
    }

    /// Replace the fields named in `patch`, leaving every other field as is
    ///
    /// Each named field is replaced wholesale, citations included. Fails
    /// with a not-found error when `id` is absent.
    fn update_record(&mut self, id: RecordId, patch: &RecordPatch) -> Result<Record, Self::Error>;

    /// Delete one record; fails with a not-found error when absent
    fn delete_record(&mut self, id: RecordId) -> Result<(), Self::Error>;

    /// Delete every record matching `query`, returning how many went
    fn delete_records_where(&mut self, query: &RecordQuery) -> Result<usize, Self::Error>;

    /// Change only the value of one field, keeping its citations
    ///
    /// A missing id fails with the same not-found error as
    /// [`update_record`](Self::update_record).
    fn update_field_value(
        &mut self,
        id: RecordId,
        key: FieldKey,
        value: &str,
    ) -> Result<Record, Self::Error> {
        let field = match self.get_record(id)? {
            Some(record) => record.field(key).with_value(value),
            None => CitedField::manual(value),
        };
        self.update_record(id, &RecordPatch::single(key, field))
    }
}

/// Storage of uploaded documents
///
/// Implemented by the infrastructure layer (citeline-store)
pub trait DocumentRepository {
    /// Error type for repository operations
    type Error: RepositoryError;

    /// Every document, in upload order
    fn list_documents(&self) -> Result<Vec<Document>, Self::Error>;

    /// One document, or `None` if absent
    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error>;

    /// Create a document in `Processing`
    fn create_document(&mut self, draft: DocumentDraft) -> Result<Document, Self::Error>;

    /// Move a document to a terminal status
    ///
    /// Fails when the document is absent or the move is not allowed by
    /// [`DocumentStatus::can_transition_to`].
    fn update_document_status(
        &mut self,
        id: DocumentId,
        status: DocumentStatus,
        error: Option<String>,
    ) -> Result<Document, Self::Error>;

    /// Delete a document and every record extracted from it
    fn delete_document(&mut self, id: DocumentId) -> Result<(), Self::Error>;
}

/// Which records the user has opened at least once
pub trait ViewedRecordLog {
    /// Error type for log operations
    type Error;

    /// Remember that `id` was shown
    fn mark_viewed(&mut self, id: RecordId) -> Result<(), Self::Error>;

    /// Every record shown so far
    fn viewed_record_ids(&self) -> Result<Vec<RecordId>, Self::Error>;
}

/// A file handed to storage and extraction
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Name as uploaded
    pub name: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Wrap bytes with their name
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Options sent with every extraction call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Ask for an array of items rather than one object
    pub array_extract: bool,
    /// Ask for citations on every field
    pub citations: bool,
    /// Ask for numeric confidence scores on citations
    pub numerical_confidence: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            array_extract: true,
            citations: true,
            numerical_confidence: true,
        }
    }
}

/// Schema, prompt and options for one extraction call
#[derive(Debug, Clone, Copy)]
pub struct ExtractionInstructions<'a> {
    /// JSON schema of the expected payload, rendered as text
    pub schema: &'a str,
    /// System prompt
    pub system_prompt: &'a str,
    /// Call options
    pub options: ExtractOptions,
}

/// What the extraction backend answered
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionReply {
    /// Synchronous result with the raw JSON payload
    Completed {
        /// Backend job identifier
        job_id: Option<String>,
        /// Raw payload, expected to hold the record array
        body: String,
    },
    /// The backend queued the job instead of answering
    Pending {
        /// Handle of the queued job
        job_id: String,
    },
}

/// Document extraction service
///
/// Implemented by the infrastructure layer (citeline-backend)
pub trait ExtractionBackend {
    /// Error type for backend calls
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run one extraction over a file
    fn extract(
        &self,
        file: &SourceFile,
        instructions: &ExtractionInstructions<'_>,
    ) -> impl Future<Output = Result<ExtractionReply, Self::Error>> + Send;
}

/// Input to the classification backend
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    /// Product name
    pub item_name: String,
    /// Product description
    pub description: String,
    /// Manufacturer
    pub manufacturer: String,
    /// Codes or divisions the answer must come from
    pub allowed_sections: Vec<String>,
}

impl ClassificationRequest {
    /// Build a request from a record's fields
    pub fn from_record(record: &Record, allowed_sections: &[String]) -> Self {
        Self {
            item_name: record.item_name.value.trim().to_string(),
            description: record.product_description.value.trim().to_string(),
            manufacturer: record.manufacturer.value.trim().to_string(),
            allowed_sections: allowed_sections.to_vec(),
        }
    }
}

/// Classification service
///
/// Implemented by the infrastructure layer (citeline-backend)
pub trait Classifier {
    /// Error type for backend calls
    type Error: std::error::Error + Send + Sync + 'static;

    /// Classify one product; returns a `"DD DD DD"` code or `"N/A"`
    fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Object storage for uploaded files
///
/// Implemented by the infrastructure layer (citeline-store)
pub trait ObjectStorage {
    /// Error type for storage operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a file, returning its opaque path
    fn store(&self, file: &SourceFile) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Public URL for a stored path
    fn url_for(&self, path: &str) -> String;
}
