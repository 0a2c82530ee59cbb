//! Configuration for the core crate
//!
//! This module provides configuration options shared by every workflow:
//! the challenge validity window, record id generation and reveal policy.

use serde::{Serialize, Deserialize};

use crate::challenge::DEFAULT_DURATION_DAYS;
use crate::id::DEFAULT_SUFFIX_LEN;

/// Challenge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Validity window written into the challenge message, in days
    pub duration_days: u32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        ChallengeConfig {
            duration_days: DEFAULT_DURATION_DAYS,
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of random base36 characters in generated record ids
    pub id_suffix_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            id_suffix_len: DEFAULT_SUFFIX_LEN,
        }
    }
}

/// Reveal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Require the challenge signature to recover to the session address
    pub verify_signer: bool,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MuseumConfig {
    /// Challenge configuration
    pub challenge: ChallengeConfig,

    /// Store configuration
    pub store: StoreConfig,

    /// Reveal configuration
    pub reveal: RevealConfig,

    /// Log level
    pub log_level: String,

    /// Whether to enable debug mode
    pub debug_mode: bool,
}

impl Default for MuseumConfig {
    fn default() -> Self {
        MuseumConfig {
            challenge: ChallengeConfig::default(),
            store: StoreConfig::default(),
            reveal: RevealConfig::default(),
            log_level: "info".to_string(),
            debug_mode: false,
        }
    }
}

impl MuseumConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self, crate::error::CoreError> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<(), crate::error::CoreError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config
    }

    /// Create a production configuration
    pub fn production() -> Self {
        let mut config = Self::default();
        config.debug_mode = false;
        config.log_level = "info".to_string();
        config.reveal.verify_signer = true;
        config
    }

    /// Create a testing configuration
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config.store.id_suffix_len = 8;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = MuseumConfig::default();

        assert_eq!(config.challenge.duration_days, 30);
        assert_eq!(config.store.id_suffix_len, 4);
        assert!(!config.reveal.verify_signer);
        assert_eq!(config.log_level, "info");
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_presets() {
        let config = MuseumConfig::development();
        assert!(config.debug_mode);
        assert_eq!(config.log_level, "debug");

        let config = MuseumConfig::production();
        assert!(!config.debug_mode);
        assert!(config.reveal.verify_signer);

        let config = MuseumConfig::testing();
        assert_eq!(config.store.id_suffix_len, 8);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MuseumConfig = serde_json::from_str(r#"{"challenge":{"duration_days":7}}"#).unwrap();
        assert_eq!(config.challenge.duration_days, 7);
        assert_eq!(config.store.id_suffix_len, 4);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_file_io() {
        let mut config = MuseumConfig::default();
        config.challenge.duration_days = 14;

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        config.to_file(path).unwrap();
        let loaded = MuseumConfig::from_file(path).unwrap();

        assert_eq!(loaded.challenge.duration_days, 14);
        assert_eq!(loaded.store.id_suffix_len, config.store.id_suffix_len);
    }
}
