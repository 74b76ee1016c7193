//! Deterministic backends for testing
//!
//! Neither mock touches the network. Both count calls and share state
//! across clones, so a test can keep one handle while the component under
//! test owns another.

use crate::BackendError;
use citeline_domain::traits::{
    ClassificationRequest, Classifier, ExtractionBackend, ExtractionInstructions, ExtractionReply,
    SourceFile,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockReply {
    Body(String),
    Pending(String),
    Error(String),
}

/// What a [`MockExtractionBackend`] was asked to do
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Name of the file extracted
    pub file_name: String,
    /// Schema sent
    pub schema: String,
    /// System prompt sent
    pub system_prompt: String,
    /// Whether array extraction was requested
    pub array_extract: bool,
    /// Whether citations were requested
    pub citations: bool,
}

/// Mock extraction backend
///
/// # Examples
///
/// ```
/// use citeline_backend::MockExtractionBackend;
///
/// let backend = MockExtractionBackend::new(r#"{"products": []}"#);
/// backend.add_error("broken.pdf", "service unavailable");
/// assert_eq!(backend.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockExtractionBackend {
    default_reply: Arc<Mutex<MockReply>>,
    by_file: Arc<Mutex<HashMap<String, MockReply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockExtractionBackend {
    /// Answer every file with the same payload
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            default_reply: Arc::new(Mutex::new(MockReply::Body(body.into()))),
            by_file: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every file with a queued job handle
    pub fn pending(job_id: impl Into<String>) -> Self {
        let mock = Self::new("");
        *lock(&mock.default_reply) = MockReply::Pending(job_id.into());
        mock
    }

    /// Answer one file name with a specific payload
    pub fn add_response(&self, file_name: impl Into<String>, body: impl Into<String>) {
        lock(&self.by_file).insert(file_name.into(), MockReply::Body(body.into()));
    }

    /// Fail one file name with a communication error
    pub fn add_error(&self, file_name: impl Into<String>, message: impl Into<String>) {
        lock(&self.by_file).insert(file_name.into(), MockReply::Error(message.into()));
    }

    /// Number of extract calls so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Every call received, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }
}

impl Default for MockExtractionBackend {
    fn default() -> Self {
        Self::new(r#"{"products": []}"#)
    }
}

impl ExtractionBackend for MockExtractionBackend {
    type Error = BackendError;

    async fn extract(
        &self,
        file: &SourceFile,
        instructions: &ExtractionInstructions<'_>,
    ) -> Result<ExtractionReply, BackendError> {
        lock(&self.calls).push(RecordedCall {
            file_name: file.name.clone(),
            schema: instructions.schema.to_string(),
            system_prompt: instructions.system_prompt.to_string(),
            array_extract: instructions.options.array_extract,
            citations: instructions.options.citations,
        });

        let reply = lock(&self.by_file)
            .get(&file.name)
            .cloned()
            .unwrap_or_else(|| lock(&self.default_reply).clone());

        match reply {
            MockReply::Body(body) => Ok(ExtractionReply::Completed {
                job_id: Some(format!("mock-{}", self.call_count())),
                body,
            }),
            MockReply::Pending(job_id) => Ok(ExtractionReply::Pending { job_id }),
            MockReply::Error(message) => Err(BackendError::Communication(message)),
        }
    }
}

/// Mock classifier
///
/// Returns a fixed code unless a specific answer or failure was registered
/// for the request's item name.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    default_code: String,
    by_item: Arc<Mutex<HashMap<String, Option<String>>>>,
    requests: Arc<Mutex<Vec<ClassificationRequest>>>,
}

impl MockClassifier {
    /// Answer every request with `code`
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            default_code: code.into(),
            by_item: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer one item name with a specific code
    pub fn add_response(&self, item_name: impl Into<String>, code: impl Into<String>) {
        lock(&self.by_item).insert(item_name.into(), Some(code.into()));
    }

    /// Fail requests for one item name
    pub fn add_error(&self, item_name: impl Into<String>) {
        lock(&self.by_item).insert(item_name.into(), None);
    }

    /// Number of classify calls so far
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received, oldest first
    pub fn requests(&self) -> Vec<ClassificationRequest> {
        lock(&self.requests).clone()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new(citeline_domain::NOT_AVAILABLE)
    }
}

impl Classifier for MockClassifier {
    type Error = BackendError;

    async fn classify(&self, request: &ClassificationRequest) -> Result<String, BackendError> {
        lock(&self.requests).push(request.clone());
        match lock(&self.by_item).get(&request.item_name) {
            Some(Some(code)) => Ok(code.clone()),
            Some(None) => Err(BackendError::Other("Mock error".to_string())),
            None => Ok(self.default_code.clone()),
        }
    }
}

// A poisoned mock mutex only happens after a panicking test; keep going.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeline_domain::traits::ExtractOptions;

    fn instructions() -> ExtractionInstructions<'static> {
        ExtractionInstructions {
            schema: "{}",
            system_prompt: "extract products",
            options: ExtractOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_mock_extraction_default() {
        let backend = MockExtractionBackend::new(r#"{"products": [1]}"#);
        let file = SourceFile::new("a.pdf", vec![1, 2, 3]);
        let reply = backend.extract(&file, &instructions()).await.unwrap();
        match reply {
            ExtractionReply::Completed { body, job_id } => {
                assert_eq!(body, r#"{"products": [1]}"#);
                assert!(job_id.is_some());
            }
            other => panic!("Expected Completed, got {:?}", other),
        }
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].file_name, "a.pdf");
        assert!(calls[0].array_extract && calls[0].citations);
    }

    #[tokio::test]
    async fn test_mock_extraction_per_file() {
        let backend = MockExtractionBackend::default();
        backend.add_response("b.pdf", "custom");
        backend.add_error("c.pdf", "boom");

        let b = backend
            .extract(&SourceFile::new("b.pdf", vec![]), &instructions())
            .await
            .unwrap();
        assert!(matches!(b, ExtractionReply::Completed { ref body, .. } if body == "custom"));

        let c = backend
            .extract(&SourceFile::new("c.pdf", vec![]), &instructions())
            .await;
        assert!(matches!(c, Err(BackendError::Communication(_))));
    }

    #[tokio::test]
    async fn test_mock_extraction_pending() {
        let backend = MockExtractionBackend::pending("job-42");
        let reply = backend
            .extract(&SourceFile::new("a.pdf", vec![]), &instructions())
            .await
            .unwrap();
        assert_eq!(
            reply,
            ExtractionReply::Pending {
                job_id: "job-42".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_mock_classifier_clone_shares_state() {
        let classifier = MockClassifier::new("09 51 00");
        classifier.add_error("Broken");
        let other = classifier.clone();

        let request = |name: &str| ClassificationRequest {
            item_name: name.to_string(),
            description: String::new(),
            manufacturer: String::new(),
            allowed_sections: vec![],
        };

        assert_eq!(other.classify(&request("Tile")).await.unwrap(), "09 51 00");
        assert!(other.classify(&request("Broken")).await.is_err());
        assert_eq!(classifier.call_count(), 2);
    }
}
