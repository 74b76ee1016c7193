//! Source documents
//!
//! A [`Document`] is one uploaded PDF. It starts in
//! [`DocumentStatus::Processing`] and moves exactly once, to `Completed` or
//! `Error`.

use crate::id::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Purchase order
    PurchaseOrder,
    /// Project specification
    Specification,
    /// Drawing set
    Drawing,
    /// Request for information
    Rfi,
    /// Submittal package
    Submittal,
}

impl DocumentType {
    /// Every document type
    pub const ALL: [DocumentType; 5] = [
        DocumentType::PurchaseOrder,
        DocumentType::Specification,
        DocumentType::Drawing,
        DocumentType::Rfi,
        DocumentType::Submittal,
    ];

    /// snake_case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::PurchaseOrder => "purchase_order",
            DocumentType::Specification => "specification",
            DocumentType::Drawing => "drawing",
            DocumentType::Rfi => "rfi",
            DocumentType::Submittal => "submittal",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::PurchaseOrder => "Purchase Order",
            DocumentType::Specification => "Specification",
            DocumentType::Drawing => "Drawing",
            DocumentType::Rfi => "RFI",
            DocumentType::Submittal => "Submittal",
        }
    }

    /// Short tag for dense listings
    pub fn abbreviation(&self) -> &'static str {
        match self {
            DocumentType::PurchaseOrder => "PO",
            DocumentType::Specification => "SPEC",
            DocumentType::Drawing => "DWG",
            DocumentType::Rfi => "RFI",
            DocumentType::Submittal => "SUB",
        }
    }

    /// Parse an identifier; dashes are accepted for underscores
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "purchase_order" | "po" => Some(DocumentType::PurchaseOrder),
            "specification" | "spec" => Some(DocumentType::Specification),
            "drawing" | "dwg" => Some(DocumentType::Drawing),
            "rfi" => Some(DocumentType::Rfi),
            "submittal" | "sub" => Some(DocumentType::Submittal),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown document type '{}'", s))
    }
}

/// Processing state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Upload accepted, extraction in flight
    Processing,
    /// All records from this document are stored
    Completed,
    /// Extraction or persistence failed
    Error,
}

impl DocumentStatus {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Error => "error",
        }
    }

    /// Parse a label
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "processing" => Some(DocumentStatus::Processing),
            "completed" => Some(DocumentStatus::Completed),
            "error" => Some(DocumentStatus::Error),
            _ => None,
        }
    }

    /// Whether this status is final
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DocumentStatus::Processing)
    }

    /// Only processing may move, and only to a terminal state
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Processing, DocumentStatus::Completed)
                | (DocumentStatus::Processing, DocumentStatus::Error)
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded source PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Immutable identifier
    pub id: DocumentId,
    /// Opaque storage path returned by object storage
    pub filename: String,
    /// Name of the file as uploaded
    pub original_name: String,
    /// Upload timestamp (Unix seconds)
    pub upload_date: u64,
    /// Processing state
    pub status: DocumentStatus,
    /// Category, selects the extraction profile
    pub document_type: DocumentType,
    /// Failure message when `status` is `Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Document {
    /// New document in `Processing`
    pub fn from_draft(draft: DocumentDraft) -> Self {
        Self {
            id: DocumentId::new(),
            filename: draft.filename,
            original_name: draft.original_name,
            upload_date: crate::current_timestamp(),
            status: DocumentStatus::Processing,
            document_type: draft.document_type,
            error: None,
        }
    }
}

/// Fields for a document that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDraft {
    /// Storage path
    pub filename: String,
    /// Name as uploaded
    pub original_name: String,
    /// Category
    pub document_type: DocumentType,
}
