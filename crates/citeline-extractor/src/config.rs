//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for extraction and the upload pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum time for a single extraction call (seconds)
    pub extraction_timeout_secs: u64,

    /// Key of the record array in the backend payload
    pub products_key: String,

    /// Ask the backend for numeric confidence scores
    pub numerical_confidence: bool,

    /// Keep processing the remaining files after one fails
    pub continue_on_error: bool,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.products_key.trim().is_empty() {
            return Err("products_key must not be empty".to_string());
        }
        Ok(())
    }

    /// Stop the batch at the first failed file
    pub fn strict() -> Self {
        Self {
            continue_on_error: false,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            extraction_timeout_secs: 300,
            products_key: "products".to_string(),
            numerical_confidence: true,
            continue_on_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.products_key, "products");
        assert!(config.continue_on_error);
    }

    #[test]
    fn test_strict_config() {
        let config = ExtractorConfig::strict();
        assert!(config.validate().is_ok());
        assert!(!config.continue_on_error);
    }

    #[test]
    fn test_invalid_timeout() {
        let config = ExtractorConfig {
            extraction_timeout_secs: 0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_products_key() {
        let config = ExtractorConfig {
            products_key: " ".to_string(),
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::strict();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("extraction_timeout_secs = 60").unwrap();
        assert_eq!(parsed.extraction_timeout_secs, 60);
        assert_eq!(parsed.products_key, "products");
    }
}
