//! Chat-completion classifier
//!
//! Asks a small chat model for the MasterFormat section of a product and
//! normalises whatever comes back to `"DD DD DD"` or `"N/A"`.

use crate::BackendError;
use citeline_domain::traits::{ClassificationRequest, Classifier};
use citeline_domain::NOT_AVAILABLE;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default classification model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for a classification request
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_TOKENS: u32 = 15;

/// Classifier backed by a chat-completions API
pub struct OpenAiClassifier {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClassifier {
    /// Create a classifier with an explicit API key
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(BackendError::Configuration(
                "Classification API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client,
        })
    }

    /// Create a classifier reading its API key from an environment variable
    pub fn from_env(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        key_var: &str,
    ) -> Result<Self, BackendError> {
        let key = crate::api_key_from_env(key_var)?;
        Self::new(endpoint, model, key)
    }

    /// Model used for classification
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Build the classification prompt for one product
pub fn build_prompt(request: &ClassificationRequest) -> String {
    format!(
        "Classify this product into a CSI MasterFormat section number.\n\n\
         Product: {}\n\
         Description: {}\n\
         Manufacturer: {}\n\n\
         Allowed MasterFormat scope (classify ONLY within these):\n{}\n\n\
         If the product does not fit any allowed section, return \"N/A\".\n\
         Return ONLY the section number (e.g., \"09 51 00\") or \"N/A\". No explanation.",
        request.item_name,
        request.description,
        request.manufacturer,
        request.allowed_sections.join("\n"),
    )
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{2})\s?(\d{2})\s?(\d{2})").expect("code regex"))
}

/// Normalise a model reply to `"DD DD DD"`, or `"N/A"` when no code is present
///
/// # Examples
///
/// ```
/// use citeline_backend::normalize_classification_code;
///
/// assert_eq!(normalize_classification_code("095100"), "09 51 00");
/// assert_eq!(normalize_classification_code("Section 09 51 00."), "09 51 00");
/// assert_eq!(normalize_classification_code("unsure"), "N/A");
/// ```
pub fn normalize_classification_code(raw: &str) -> String {
    match code_pattern().captures(raw.trim()) {
        Some(caps) => format!("{} {} {}", &caps[1], &caps[2], &caps[3]),
        None => NOT_AVAILABLE.to_string(),
    }
}

impl Classifier for OpenAiClassifier {
    type Error = BackendError;

    async fn classify(&self, request: &ClassificationRequest) -> Result<String, BackendError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(request),
            }],
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let raw = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        debug!("Classifier replied {:?} for '{}'", raw, request.item_name);
        Ok(normalize_classification_code(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_variants() {
        assert_eq!(normalize_classification_code("09 51 00"), "09 51 00");
        assert_eq!(normalize_classification_code("09 5100"), "09 51 00");
        assert_eq!(normalize_classification_code("\"12 24 00\""), "12 24 00");
        assert_eq!(normalize_classification_code("N/A"), NOT_AVAILABLE);
        assert_eq!(normalize_classification_code(""), NOT_AVAILABLE);
        // Dotted codes don't match the pattern
        assert_eq!(normalize_classification_code("09.51.00"), NOT_AVAILABLE);
    }

    #[test]
    fn test_prompt_includes_scope() {
        let request = ClassificationRequest {
            item_name: "Acoustic Ceiling Panel".to_string(),
            description: "2x2 lay-in".to_string(),
            manufacturer: "Armstrong".to_string(),
            allowed_sections: vec!["Division 09 - Finishes".to_string()],
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Product: Acoustic Ceiling Panel"));
        assert!(prompt.contains("Manufacturer: Armstrong"));
        assert!(prompt.contains("Division 09 - Finishes"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = OpenAiClassifier::new(DEFAULT_ENDPOINT, DEFAULT_MODEL, "");
        assert!(matches!(result, Err(BackendError::Configuration(_))));
        let ok = OpenAiClassifier::new(DEFAULT_ENDPOINT, DEFAULT_MODEL, "k").unwrap();
        assert_eq!(ok.model(), DEFAULT_MODEL);
    }
}
