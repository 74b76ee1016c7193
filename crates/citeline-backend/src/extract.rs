//! HTTP extraction service client
//!
//! Two calls per file: a multipart upload that returns a file handle, then
//! a synchronous extract run over that handle with the schema, system
//! prompt and citation settings.
//!
//! # Examples
//!
//! ```no_run
//! use citeline_backend::ExtractClient;
//!
//! // Reads the key from EXTRACT_API_KEY; fails if it is not set
//! let client = ExtractClient::from_env("https://platform.reducto.ai", "EXTRACT_API_KEY")?;
//! # Ok::<(), citeline_backend::BackendError>(())
//! ```

use crate::BackendError;
use citeline_domain::traits::{
    ExtractionBackend, ExtractionInstructions, ExtractionReply, SourceFile,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default extraction service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://platform.reducto.ai";

/// Default timeout for a single HTTP request (extraction is slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Client for the document extraction service
pub struct ExtractClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Deserialize)]
struct UploadResponse {
    file_id: String,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    input: &'a str,
    instructions: Instructions<'a>,
    settings: Settings,
}

#[derive(Serialize)]
struct Instructions<'a> {
    schema: Value,
    system_prompt: &'a str,
}

#[derive(Serialize)]
struct Settings {
    array_extract: bool,
    citations: CitationSettings,
}

#[derive(Serialize)]
struct CitationSettings {
    enabled: bool,
    numerical_confidence: bool,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

impl ExtractClient {
    /// Create a client with an explicit API key
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, BackendError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(BackendError::Configuration(
                "Extraction API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a client reading its API key from an environment variable
    pub fn from_env(endpoint: impl Into<String>, key_var: &str) -> Result<Self, BackendError> {
        let key = crate::api_key_from_env(key_var)?;
        Self::new(endpoint, key)
    }

    /// Set the maximum number of attempts per request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn upload(&self, file: &SourceFile) -> Result<String, BackendError> {
        let url = format!("{}/upload", self.endpoint);
        let response = self
            .send_with_retry(|| {
                let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.name.clone());
                let form = reqwest::multipart::Form::new().part("file", part);
                self.client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .multipart(form)
            })
            .await?;

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Upload response: {}", e)))?;
        debug!("Uploaded '{}' as {}", file.name, upload.file_id);
        Ok(upload.file_id)
    }

    async fn run_extract(
        &self,
        file_id: &str,
        instructions: &ExtractionInstructions<'_>,
    ) -> Result<ExtractionReply, BackendError> {
        let schema: Value = serde_json::from_str(instructions.schema)
            .map_err(|e| BackendError::Configuration(format!("Invalid extraction schema: {}", e)))?;

        let body = ExtractRequest {
            input: file_id,
            instructions: Instructions {
                schema,
                system_prompt: instructions.system_prompt,
            },
            settings: Settings {
                array_extract: instructions.options.array_extract,
                citations: CitationSettings {
                    enabled: instructions.options.citations,
                    numerical_confidence: instructions.options.numerical_confidence,
                },
            },
        };

        let url = format!("{}/extract", self.endpoint);
        let response = self
            .send_with_retry(|| self.client.post(&url).bearer_auth(&self.api_key).json(&body))
            .await?;

        let parsed: ExtractResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Extract response: {}", e)))?;

        match (parsed.result, parsed.job_id) {
            (Some(result), job_id) => Ok(ExtractionReply::Completed {
                job_id,
                body: result.to_string(),
            }),
            (None, Some(job_id)) => Ok(ExtractionReply::Pending { job_id }),
            (None, None) => Err(BackendError::InvalidResponse(
                "Response has neither result nor job_id".to_string(),
            )),
        }
    }

    /// Send a request, retrying transport failures and 5xx with exponential backoff
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response, BackendError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(BackendError::RateLimitExceeded);
                    } else if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(BackendError::Configuration(format!(
                            "Extraction service rejected credentials (HTTP {})",
                            status
                        )));
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        let error =
                            BackendError::Communication(format!("HTTP {}: {}", status, error_text));
                        if status.is_client_error() {
                            return Err(error);
                        }
                        last_error = Some(error);
                    }
                }
                Err(e) => {
                    last_error = Some(BackendError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Extraction request failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| BackendError::Communication("Max retries exceeded".to_string())))
    }
}

impl ExtractionBackend for ExtractClient {
    type Error = BackendError;

    async fn extract(
        &self,
        file: &SourceFile,
        instructions: &ExtractionInstructions<'_>,
    ) -> Result<ExtractionReply, BackendError> {
        info!("Uploading '{}' ({} bytes) for extraction", file.name, file.bytes.len());
        let file_id = self.upload(file).await?;
        let reply = self.run_extract(&file_id, instructions).await?;
        if let ExtractionReply::Completed { job_id, .. } = &reply {
            info!("Extraction finished for '{}' (job {:?})", file.name, job_id);
        }
        Ok(reply)
    }
}
