//! Upload pipeline: store, register, extract, persist, complete
//!
//! Files are processed one at a time. A document is marked completed only
//! after its records are stored, and any failure after the document was
//! created moves it to error, so no document is left in processing once
//! its file has been handled.

use crate::error::ExtractorError;
use crate::extractor::Extractor;
use crate::types::{BatchReport, ExtractionRequest, FileOutcome};
use citeline_domain::traits::{DocumentRepository, ExtractionBackend, ObjectStorage, RecordRepository, SourceFile};
use citeline_domain::{Document, DocumentDraft, DocumentId, DocumentStatus, DocumentType};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Runs uploaded files through storage, extraction and the repository
pub struct Ingestor<B, S, R>
where
    B: ExtractionBackend,
    S: ObjectStorage,
    R: RecordRepository + DocumentRepository,
{
    extractor: Extractor<B>,
    storage: Arc<S>,
    repository: Arc<Mutex<R>>,
}

impl<B, S, R> Ingestor<B, S, R>
where
    B: ExtractionBackend + Send + Sync,
    S: ObjectStorage + Send + Sync,
    R: RecordRepository + DocumentRepository + Send,
{
    /// Create a new Ingestor
    pub fn new(extractor: Extractor<B>, storage: Arc<S>, repository: Arc<Mutex<R>>) -> Self {
        Self {
            extractor,
            storage,
            repository,
        }
    }

    /// Shared handle to the repository
    pub fn repository(&self) -> Arc<Mutex<R>> {
        Arc::clone(&self.repository)
    }

    /// Process files in order, one fully finishing before the next starts
    pub async fn ingest(&self, files: Vec<SourceFile>, document_type: DocumentType) -> BatchReport {
        let continue_on_error = self.extractor.config().continue_on_error;
        let mut report = BatchReport::default();
        let mut halted = false;

        for file in files {
            let name = file.name.clone();
            if halted {
                report.files.push((name, FileOutcome::Skipped));
                continue;
            }

            let outcome = self.ingest_file(file, document_type).await;
            if matches!(outcome, FileOutcome::Failed { .. }) && !continue_on_error {
                warn!("Stopping batch after failure on '{}'", name);
                halted = true;
            }
            report.files.push((name, outcome));
        }

        info!(
            "Upload batch finished: {} completed, {} failed, {} skipped, {} records",
            report.completed(),
            report.failed(),
            report.skipped(),
            report.records_created()
        );
        report
    }

    /// Process a single file
    pub async fn ingest_file(&self, file: SourceFile, document_type: DocumentType) -> FileOutcome {
        let path = match self.storage.store(&file).await {
            Ok(path) => path,
            Err(e) => {
                let err = ExtractorError::Storage(e.to_string());
                error!("Failed to store '{}': {}", file.name, err);
                return FileOutcome::Failed {
                    document_id: None,
                    error: err.to_string(),
                };
            }
        };

        let draft = DocumentDraft {
            filename: path,
            original_name: file.name.clone(),
            document_type,
        };
        let document = match self.with_repo(|repo| repo.create_document(draft).map_err(|e| e.to_string())) {
            Ok(document) => document,
            Err(err) => {
                error!("Failed to register '{}': {}", file.name, err);
                return FileOutcome::Failed {
                    document_id: None,
                    error: err.to_string(),
                };
            }
        };
        info!("Document {} created for '{}' (processing)", document.id, file.name);

        let result = match self.extract_and_store(file, &document).await {
            Ok(count) => self
                .set_status(document.id, DocumentStatus::Completed, None)
                .map(|_| count),
            Err(e) => Err(e),
        };

        match result {
            Ok(records) => {
                info!("Document {} completed with {} records", document.id, records);
                FileOutcome::Completed {
                    document_id: document.id,
                    records,
                }
            }
            Err(err) => {
                error!("Processing document {} failed: {}", document.id, err);
                if let Err(mark_err) =
                    self.set_status(document.id, DocumentStatus::Error, Some(err.to_string()))
                {
                    error!("Could not mark document {} as error: {}", document.id, mark_err);
                }
                FileOutcome::Failed {
                    document_id: Some(document.id),
                    error: err.to_string(),
                }
            }
        }
    }

    async fn extract_and_store(&self, file: SourceFile, document: &Document) -> Result<usize, ExtractorError> {
        let request = ExtractionRequest {
            file,
            document_id: document.id,
            document_type: document.document_type,
        };
        let result = self.extractor.extract(request).await?;
        let count = result.records.len();
        self.with_repo(|repo| repo.insert_records(result.records).map_err(|e| e.to_string()))?;
        Ok(count)
    }

    fn set_status(
        &self,
        id: DocumentId,
        status: DocumentStatus,
        message: Option<String>,
    ) -> Result<Document, ExtractorError> {
        let document = self.with_repo(|repo| {
            repo.update_document_status(id, status, message)
                .map_err(|e| e.to_string())
        })?;
        info!("Document {} is now {}", id, status);
        Ok(document)
    }

    fn with_repo<T>(&self, f: impl FnOnce(&mut R) -> Result<T, String>) -> Result<T, ExtractorError> {
        let mut repo = self
            .repository
            .lock()
            .map_err(|_| ExtractorError::Store("Repository lock poisoned".to_string()))?;
        f(&mut *repo).map_err(ExtractorError::Store)
    }
}
