use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::{Strategy, ThresholdConfig, ThresholdRule, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::history::HistoryLog;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,
    pub strategy: Strategy,

    // Sampling
    pub sample_count: usize,
    pub sample_interval_ms: u64,

    // Confidence tiering
    pub confidence_threshold: f32,
    pub threshold_rule: ThresholdRule,

    // Model path
    pub model_path: Option<PathBuf>,

    // History window
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            strategy: Strategy::Average,
            sample_count: 5,
            sample_interval_ms: 200,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            threshold_rule: ThresholdRule::Strict,
            model_path: None,
            history_limit: HistoryLog::DEFAULT_LIMIT,
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    /// Get the default config directory
    pub fn default_config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".emotion-cli"))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.json"))
    }

    /// Get the emotion model file path
    pub fn get_model_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.model_path {
            Ok(path.clone())
        } else {
            Ok(Self::default_config_dir()?
                .join("models")
                .join("emotion.onnx"))
        }
    }

    /// Confidence tier settings as used by the aggregator
    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig {
            threshold: self.confidence_threshold,
            rule: self.threshold_rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.strategy, Strategy::Average);
        assert_eq!(config.sample_count, 5);
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.threshold_rule, ThresholdRule::Strict);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.sample_count, 5);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.strategy = Strategy::MajorityVote;
        config.confidence_threshold = 0.4;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.strategy, Strategy::MajorityVote);
        assert_eq!(loaded.confidence_threshold, 0.4);
    }

    #[test]
    fn test_explicit_model_path_wins() {
        let mut config = Config::default();
        config.model_path = Some(PathBuf::from("/tmp/custom.onnx"));
        assert_eq!(
            config.get_model_path().unwrap(),
            PathBuf::from("/tmp/custom.onnx")
        );
    }
}
