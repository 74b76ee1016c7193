//! Citeline Extractor
//!
//! Turns uploaded PDFs into product records with citations.
//!
//! # Architecture
//!
//! ```text
//! PDF → ObjectStorage → Document(processing) → ExtractionBackend → Records → Repository → Document(completed)
//! ```
//!
//! # Key Features
//!
//! - **Profile selection**: a schema and system prompt per document type
//! - **Tolerant payload parsing**: missing fields and boxes are repaired, not rejected
//! - **Sequential ingestion**: one file at a time, with an unambiguous document status
//! - **Batch reports**: "zero records" and "failed" are distinct outcomes
//!
//! # Example Usage
//!
//! ```no_run
//! use citeline_extractor::{Extractor, ExtractorConfig, ExtractionRequest};
//! use citeline_backend::MockExtractionBackend;
//! use citeline_domain::{DocumentId, DocumentType};
//! use citeline_domain::traits::SourceFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MockExtractionBackend::new(r#"{"products": []}"#);
//! let extractor = Extractor::new(backend, ExtractorConfig::default());
//!
//! let result = extractor
//!     .extract(ExtractionRequest {
//!         file: SourceFile::new("po.pdf", std::fs::read("po.pdf")?),
//!         document_id: DocumentId::new(),
//!         document_type: DocumentType::PurchaseOrder,
//!     })
//!     .await?;
//!
//! println!("Extracted {} records", result.records.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod ingest;
mod parser;
mod prompt;
mod types;


pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use ingest::Ingestor;
pub use parser::parse_products;
pub use prompt::{profile_for, ExtractionProfile, ProfileKind};
pub use types::{BatchReport, ExtractionMetadata, ExtractionRequest, ExtractionResult, FileOutcome};
