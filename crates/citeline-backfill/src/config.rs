//! Configuration for classification backfill

use serde::{Deserialize, Serialize};

/// MasterFormat scope offered to the classifier unless configured otherwise
///
/// Whole divisions allow any section inside them; restricted divisions
/// name the only section allowed.
pub const DEFAULT_ALLOWED_SECTIONS: [&str; 5] = [
    "Division 09 - Finishes (all sections, e.g. 09 21 00, 09 30 00, 09 51 00, 09 64 00, 09 68 00, 09 91 00)",
    "Division 11 - Equipment: 11 22 00 - Commercial Equipment / Appliances only",
    "Division 12 - Furnishings (all sections, e.g. 12 21 00, 12 24 00, 12 35 00, 12 36 00, 12 48 00, 12 50 00, 12 93 00)",
    "Division 22 - Plumbing: 22 40 00 - Plumbing Fixtures only",
    "Division 26 - Electrical: 26 50 00 - Lighting Fixtures only",
];

/// Configuration for the Backfiller
///
/// # Examples
///
/// ```
/// use citeline_backfill::BackfillConfig;
///
/// let config = BackfillConfig::default();
/// assert_eq!(config.allowed_sections.len(), 5);
/// assert!(config.max_in_flight.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    /// Sections the classifier may answer with
    pub allowed_sections: Vec<String>,

    /// Cap on concurrent classification calls
    /// Default: none, every call in flight at once
    pub max_in_flight: Option<usize>,

    /// Classify but do not write anything back
    pub dry_run: bool,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            allowed_sections: DEFAULT_ALLOWED_SECTIONS.iter().map(|s| s.to_string()).collect(),
            max_in_flight: None,
            dry_run: false,
        }
    }
}

impl BackfillConfig {
    /// Same configuration, but nothing is persisted
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.allowed_sections.iter().all(|s| s.trim().is_empty()) {
            return Err("allowed_sections must list at least one section".to_string());
        }
        if self.max_in_flight == Some(0) {
            return Err("max_in_flight must be greater than 0".to_string());
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BackfillConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.dry_run);
        assert!(config.allowed_sections[3].contains("22 40 00"));
    }

    #[test]
    fn test_dry_run_preset() {
        let config = BackfillConfig::dry_run();
        assert!(config.dry_run);
        assert_eq!(config.allowed_sections, BackfillConfig::default().allowed_sections);
    }

    #[test]
    fn test_invalid_configs() {
        let empty = BackfillConfig {
            allowed_sections: vec![" ".to_string()],
            ..BackfillConfig::default()
        };
        assert!(empty.validate().is_err());

        let zero = BackfillConfig {
            max_in_flight: Some(0),
            ..BackfillConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BackfillConfig {
            allowed_sections: vec!["09 51 00".to_string()],
            max_in_flight: Some(4),
            dry_run: true,
        };
        let parsed = BackfillConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = BackfillConfig::from_toml("max_in_flight = 2").unwrap();
        assert_eq!(parsed.max_in_flight, Some(2));
        assert_eq!(parsed.allowed_sections.len(), 5);
    }
}
