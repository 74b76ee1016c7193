//! Request and response types for extraction and ingestion

use crate::prompt::ProfileKind;
use citeline_domain::traits::SourceFile;
use citeline_domain::{DocumentId, DocumentType, Record};

/// Request to extract records from one file
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// File to extract from
    pub file: SourceFile,

    /// Document the records will belong to
    pub document_id: DocumentId,

    /// Type of the document, selects the profile
    pub document_type: DocumentType,
}

/// Result of an extraction operation
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Records built from the payload, each with a fresh id
    pub records: Vec<Record>,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction operation
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Document the records belong to
    pub document_id: DocumentId,

    /// Backend job identifier, if it reported one
    pub job_id: Option<String>,

    /// Profile the request was sent with
    pub profile: ProfileKind,

    /// Timestamp of extraction (Unix seconds)
    pub timestamp: u64,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// What happened to one file of an upload batch
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Records stored and document marked completed
    Completed {
        /// The document created for the file
        document_id: DocumentId,
        /// Number of records stored; zero is a valid, successful result
        records: usize,
    },
    /// Something failed; the document, if one was created, is in error
    Failed {
        /// The document created for the file, if it got that far
        document_id: Option<DocumentId>,
        /// What went wrong
        error: String,
    },
    /// Not attempted because an earlier file failed
    Skipped,
}

/// Per-file results of an upload batch, in input order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// File name and outcome
    pub files: Vec<(String, FileOutcome)>,
}

impl BatchReport {
    /// Files that completed
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Completed { .. }))
    }

    /// Files that failed
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    /// Files not attempted
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped))
    }

    /// Records stored across all files
    pub fn records_created(&self) -> usize {
        self.files
            .iter()
            .map(|(_, o)| match o {
                FileOutcome::Completed { records, .. } => *records,
                _ => 0,
            })
            .sum()
    }

    /// Whether any file failed
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|(_, o)| pred(o)).count()
    }
}
