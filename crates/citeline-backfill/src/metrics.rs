//! Metrics collected during a backfill run

/// Counts for one backfill run
///
/// Every examined record lands in exactly one of the outcome buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillMetrics {
    /// Records looked at
    pub examined: usize,

    /// Already had a classification code
    pub already_classified: usize,

    /// No name or description to classify from
    pub skipped_no_text: usize,

    /// Received a code
    pub classified: usize,

    /// Classifier answered "N/A"
    pub not_applicable: usize,

    /// Classifier call failed
    pub failed: usize,

    /// Codes written back to the repository
    pub persisted: usize,

    /// Wall-clock time of the classification phase
    pub runtime_ms: u64,
}

impl BackfillMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that needed a classifier call
    pub fn attempted(&self) -> usize {
        self.classified + self.not_applicable + self.failed
    }

    /// Whether any classifier call failed
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Backfill Summary".to_string(),
            "================".to_string(),
            format!("Examined: {}", self.examined),
            format!("Already classified: {}", self.already_classified),
            format!("Skipped (no text): {}", self.skipped_no_text),
            format!("Classified: {}", self.classified),
            format!("Not applicable: {}", self.not_applicable),
            format!("Failed: {}", self.failed),
            format!("Persisted: {}", self.persisted),
            format!("Runtime: {}ms", self.runtime_ms),
        ];
        lines.join("\n")
    }
}
