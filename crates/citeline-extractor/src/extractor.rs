//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_products;
use crate::prompt::profile_for;
use crate::types::{ExtractionMetadata, ExtractionRequest, ExtractionResult};
use citeline_domain::traits::{
    ExtractOptions, ExtractionBackend, ExtractionInstructions, ExtractionReply,
};
use citeline_domain::Record;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::timeout;
use tracing::{debug, info};

/// The Extractor turns a PDF into records through an extraction backend
pub struct Extractor<B>
where
    B: ExtractionBackend,
{
    backend: Arc<B>,
    config: ExtractorConfig,
}

impl<B> Extractor<B>
where
    B: ExtractionBackend + Send + Sync,
{
    /// Create a new Extractor
    pub fn new(backend: B, config: ExtractorConfig) -> Self {
        Self::with_shared(Arc::new(backend), config)
    }

    /// Create an Extractor over a backend that is shared elsewhere
    pub fn with_shared(backend: Arc<B>, config: ExtractorConfig) -> Self {
        Self { backend, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract records from one file
    ///
    /// Makes exactly one backend call. Backend errors, timeouts, invalid
    /// JSON and queued jobs are errors; a payload without a record array
    /// is a successful, empty result.
    pub async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResult, ExtractorError> {
        let start_time = SystemTime::now();
        let profile = profile_for(request.document_type, &self.config.products_key);

        info!(
            "Starting extraction of '{}' as {} ({} profile)",
            request.file.name,
            request.document_type,
            profile.kind.as_str()
        );

        let instructions = ExtractionInstructions {
            schema: &profile.schema,
            system_prompt: profile.prompt,
            options: ExtractOptions {
                array_extract: true,
                citations: true,
                numerical_confidence: self.config.numerical_confidence,
            },
        };

        let reply = timeout(
            self.config.extraction_timeout(),
            self.backend.extract(&request.file, &instructions),
        )
        .await
        .map_err(|_| ExtractorError::Timeout(self.config.extraction_timeout_secs))?
        .map_err(|e| ExtractorError::Backend(e.to_string()))?;

        let (job_id, body) = match reply {
            ExtractionReply::Completed { job_id, body } => (job_id, body),
            ExtractionReply::Pending { job_id } => return Err(ExtractorError::AsyncJob(job_id)),
        };

        debug!("Extraction payload length: {} chars", body.len());

        let drafts = parse_products(
            &body,
            &self.config.products_key,
            request.document_id,
            request.document_type,
        )?;
        let records: Vec<Record> = drafts.into_iter().map(Record::from_draft).collect();

        let processing_time_ms = start_time
            .elapsed()
            .unwrap_or(Duration::from_secs(0))
            .as_millis() as u64;

        info!(
            "Extraction complete: {} records from '{}' (job {:?})",
            records.len(),
            request.file.name,
            job_id
        );

        Ok(ExtractionResult {
            records,
            metadata: ExtractionMetadata {
                document_id: request.document_id,
                job_id,
                profile: profile.kind,
                timestamp: citeline_domain::current_timestamp(),
                processing_time_ms,
            },
        })
    }
}
