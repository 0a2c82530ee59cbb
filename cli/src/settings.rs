//! Command-line configuration
//!
//! Settings come from an optional file, then `MOOD_MUSEUM_*` environment
//! variables, then command-line flags. Nested keys use a double
//! underscore in the environment, e.g. `MOOD_MUSEUM_CONTRACT__RPC_ENDPOINT`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use config::{Config, Environment, File};
use mood_museum_client::ContractConfig;
use mood_museum_core::MuseumConfig;
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "MOOD_MUSEUM";

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process map, lost on exit
    Memory,
    /// Local SQLite file
    #[default]
    Sqlite,
    /// Deployed contract
    Contract,
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Backend kind
    pub backend: BackendKind,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Contract connection
    pub contract: ContractConfig,

    /// Museum settings
    pub museum: MuseumConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            database_path: PathBuf::from("mood-museum.db"),
            contract: ContractConfig::default(),
            museum: MuseumConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path` (if given) and the environment
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|settings| settings.try_deserialize())
            .with_context(|| match path {
                Some(path) => format!("Failed to load configuration from {}", path),
                None => "Failed to load configuration".to_string(),
            })
    }
}
