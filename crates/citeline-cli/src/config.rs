//! Configuration management for the CLI.
//!
//! Credentials never live in this file; it only names the environment
//! variables they are read from.

use crate::error::{CliError, Result};
use citeline_backfill::{BackfillConfig, DEFAULT_ALLOWED_SECTIONS};
use citeline_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Root directory for uploaded PDFs
    pub storage_dir: PathBuf,

    /// Base URL the storage directory is served from, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,

    /// Extraction backend
    pub extraction: ExtractionSettings,

    /// Classification backend
    pub classification: ClassificationSettings,

    /// Global settings
    pub settings: Settings,
}

/// Extraction backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Service base URL
    pub endpoint: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Timeout for one extraction call, in seconds
    pub timeout_secs: u64,

    /// Attempts per HTTP request
    pub max_retries: u32,

    /// Keep going after a file fails
    pub continue_on_error: bool,
}

/// Classification backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationSettings {
    /// Service base URL
    pub endpoint: String,

    /// Chat model
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Sections the classifier may answer with
    pub allowed_sections: Vec<String>,

    /// Cap on concurrent classification calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the default config, database and files.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".citeline"))
    }

    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Extractor settings derived from this file.
    pub fn extractor_config(&self) -> Result<ExtractorConfig> {
        let config = ExtractorConfig {
            extraction_timeout_secs: self.extraction.timeout_secs,
            continue_on_error: self.extraction.continue_on_error,
            ..ExtractorConfig::default()
        };
        config.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Backfill settings derived from this file.
    pub fn backfill_config(&self, dry_run: bool) -> Result<BackfillConfig> {
        let config = BackfillConfig {
            allowed_sections: self.classification.allowed_sections.clone(),
            max_in_flight: self.classification.max_in_flight,
            dry_run,
        };
        config.validate().map_err(CliError::Config)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = Self::home().unwrap_or_else(|_| PathBuf::from(".citeline"));
        Self {
            database_path: home.join("citeline.db"),
            storage_dir: home.join("files"),
            public_base_url: None,
            extraction: ExtractionSettings::default(),
            classification: ClassificationSettings::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            endpoint: citeline_backend::extract::DEFAULT_ENDPOINT.to_string(),
            api_key_env: "REDUCTO_API_KEY".to_string(),
            timeout_secs: 300,
            max_retries: 3,
            continue_on_error: true,
        }
    }
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            endpoint: citeline_backend::openai::DEFAULT_ENDPOINT.to_string(),
            model: citeline_backend::openai::DEFAULT_MODEL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            allowed_sections: DEFAULT_ALLOWED_SECTIONS.iter().map(|s| s.to_string()).collect(),
            max_in_flight: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.extraction.api_key_env, "REDUCTO_API_KEY");
        assert!(config.database_path.ends_with("citeline.db"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.public_base_url = Some("https://files.example.com".to_string());
        config.classification.max_in_flight = Some(4);
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[extraction]\ntimeout_secs = 60\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.extraction.timeout_secs, 60);
        assert_eq!(loaded.extraction.max_retries, 3);
        assert_eq!(loaded.classification.allowed_sections.len(), 5);
    }

    #[test]
    fn test_derived_configs_are_validated() {
        let mut config = Config::default();
        assert_eq!(config.extractor_config().unwrap().extraction_timeout_secs, 300);
        assert!(config.backfill_config(true).unwrap().dry_run);

        config.extraction.timeout_secs = 0;
        assert!(config.extractor_config().is_err());

        config.classification.allowed_sections.clear();
        assert!(config.backfill_config(false).is_err());
    }
}
