use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Thresholds used by the year analysis
    pub analysis: AnalysisSettings,

    /// Data import preferences
    pub import: ImportSettings,

    /// Logging preferences
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Thresholds for the year analysis.
///
/// The defaults reproduce the published behaviour of the year review; changing them is
/// meant for experimentation with noisy devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Heart-rate readings above this are treated as sensor artifacts (bpm)
    pub max_plausible_heart_rate: u16,

    /// Average heart rate assumed for activities without one when estimating heartbeats
    pub fallback_activity_heart_rate: u16,

    /// Percentage change between the two halves of the year counted as an HRV trend
    pub hrv_trend_threshold_pct: f64,

    /// Percentage change counted as a running-form or FTP trend
    pub form_trend_threshold_pct: f64,

    /// Minimum samples before a two-half trend is attempted
    pub min_trend_samples: usize,

    /// Minimum activities in the previous year before a comparison is produced
    pub previous_year_min_activities: usize,
}

/// Data import preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Descend into subdirectories when importing a directory
    pub recursive: bool,

    /// Show a progress bar for directory imports
    pub show_progress: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metadata: ConfigMetadata::default(),
            analysis: AnalysisSettings::default(),
            import: ImportSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        ConfigMetadata {
            version: "1.0".to_string(),
            updated_at: Utc::now(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            max_plausible_heart_rate: 210,
            fallback_activity_heart_rate: 140,
            hrv_trend_threshold_pct: 5.0,
            form_trend_threshold_pct: 3.0,
            min_trend_samples: 10,
            previous_year_min_activities: 10,
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            recursive: false,
            show_progress: true,
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fitwrapped")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %err,
                    "Config file not loaded, using defaults"
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.analysis, deserialized.analysis);
        assert_eq!(config.import, deserialized.import);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            [analysis]
            max_plausible_heart_rate = 220
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.analysis.max_plausible_heart_rate, 220);
        assert_eq!(config.analysis.min_trend_samples, 10);
        assert!(config.import.show_progress);
        assert!(!config.import.recursive);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = AppConfig::default();
        original_config.analysis.previous_year_min_activities = 25;
        original_config.logging.level = LogLevel::Debug;

        original_config.save_to_file(&config_path).unwrap();
        let loaded_config = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded_config.analysis.previous_year_min_activities, 25);
        assert_eq!(loaded_config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let result = AppConfig::load_from_file(temp_dir.path().join("absent.toml"));
        assert!(result.is_err());
    }
}
