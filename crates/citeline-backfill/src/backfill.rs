//! Classification backfill for records without a code

use crate::{BackfillConfig, BackfillError, BackfillMetrics};
use citeline_domain::traits::{ClassificationRequest, Classifier, RecordRepository, RepositoryError};
use citeline_domain::{CitedField, FieldKey, Record, RecordId, RecordPatch, NOT_AVAILABLE};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What happened to one record
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    AlreadyClassified,
    NoText,
    Classified(String),
    NotApplicable,
    Failed,
}

/// Result of a backfill pass
#[derive(Debug, Clone)]
pub struct BackfillRun {
    /// Input records, in input order, with codes filled in
    pub records: Vec<Record>,
    /// Records that received a code, and the code
    pub filled: Vec<(RecordId, String)>,
    /// Counters for the run
    pub metrics: BackfillMetrics,
}

/// Fills missing classification codes from a [`Classifier`]
///
/// Backfilled codes carry no citations, which is what marks them as
/// generated. Records that already have a code are never sent to the
/// classifier, so a second run over the same records changes nothing.
///
/// # Examples
///
/// ```no_run
/// use citeline_backfill::{Backfiller, BackfillConfig};
/// use citeline_backend::MockClassifier;
///
/// # async fn example(records: Vec<citeline_domain::Record>) {
/// let backfiller = Backfiller::new(MockClassifier::new("09 51 00"), BackfillConfig::default());
/// let run = backfiller.backfill(records).await;
/// println!("{}", run.metrics.summary());
/// # }
/// ```
pub struct Backfiller<C: Classifier> {
    classifier: Arc<C>,
    config: BackfillConfig,
}

impl<C: Classifier> Backfiller<C> {
    /// Create a new Backfiller
    pub fn new(classifier: C, config: BackfillConfig) -> Self {
        Self::with_shared(Arc::new(classifier), config)
    }

    /// Create a Backfiller around a shared classifier
    pub fn with_shared(classifier: Arc<C>, config: BackfillConfig) -> Self {
        Self { classifier, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &BackfillConfig {
        &self.config
    }

    /// Classify every record missing a code
    ///
    /// Calls run concurrently, all at once unless `max_in_flight` caps
    /// them. A failed call leaves its record unchanged and does not affect
    /// the others.
    pub async fn backfill(&self, records: Vec<Record>) -> BackfillRun {
        let start = Instant::now();

        let outcomes: Vec<Outcome> = match self.config.max_in_flight {
            None => join_all(records.iter().map(|r| self.classify_one(r))).await,
            Some(limit) => {
                stream::iter(records.iter().map(|r| self.classify_one(r)))
                    .buffered(limit.max(1))
                    .collect()
                    .await
            }
        };

        let mut metrics = BackfillMetrics::new();
        let mut filled = Vec::new();
        let mut updated = Vec::with_capacity(records.len());

        for (mut record, outcome) in records.into_iter().zip(outcomes) {
            metrics.examined += 1;
            match outcome {
                Outcome::AlreadyClassified => metrics.already_classified += 1,
                Outcome::NoText => metrics.skipped_no_text += 1,
                Outcome::NotApplicable => metrics.not_applicable += 1,
                Outcome::Failed => metrics.failed += 1,
                Outcome::Classified(code) => {
                    metrics.classified += 1;
                    record.set_field(FieldKey::SpecIdNumber, CitedField::manual(code.clone()));
                    filled.push((record.id, code));
                }
            }
            updated.push(record);
        }

        metrics.runtime_ms = start.elapsed().as_millis() as u64;
        info!(
            "Backfill examined {} records: {} classified, {} failed",
            metrics.examined, metrics.classified, metrics.failed
        );

        BackfillRun {
            records: updated,
            filled,
            metrics,
        }
    }

    /// Backfill every record in `repo` and write the codes back
    ///
    /// Only the classification field is patched. Nothing is written in
    /// dry-run mode. A record deleted while its call was in flight is
    /// skipped.
    pub async fn backfill_and_persist<R: RecordRepository>(
        &self,
        repo: &mut R,
    ) -> Result<BackfillRun, BackfillError> {
        let records = repo
            .list_records()
            .map_err(|e| BackfillError::Store(e.to_string()))?;
        let mut run = self.backfill(records).await;

        if self.config.dry_run {
            info!("DRY RUN: would write {} classification codes", run.filled.len());
            return Ok(run);
        }

        for (id, code) in &run.filled {
            let patch = RecordPatch::single(FieldKey::SpecIdNumber, CitedField::manual(code.clone()));
            match repo.update_record(*id, &patch) {
                Ok(_) => run.metrics.persisted += 1,
                Err(e) if e.is_not_found() => {
                    warn!("Record {} disappeared before its code was saved", id);
                }
                Err(e) => return Err(BackfillError::Store(e.to_string())),
            }
        }

        Ok(run)
    }

    async fn classify_one(&self, record: &Record) -> Outcome {
        if !record.spec_id_number.is_missing() {
            return Outcome::AlreadyClassified;
        }

        let request = ClassificationRequest::from_record(record, &self.config.allowed_sections);
        if request.item_name.is_empty() && request.description.is_empty() {
            debug!("Record {} has no text to classify", record.id.short());
            return Outcome::NoText;
        }

        match self.classifier.classify(&request).await {
            Ok(code) => {
                let code = code.trim();
                if code.is_empty() || code.eq_ignore_ascii_case(NOT_AVAILABLE) {
                    Outcome::NotApplicable
                } else {
                    debug!("Classified {:?} as {}", request.item_name, code);
                    Outcome::Classified(code.to_string())
                }
            }
            Err(e) => {
                warn!("Classification failed for {:?}: {}", request.item_name, e);
                Outcome::Failed
            }
        }
    }
}
