//! Configuration Module
//!
//! This module defines the configuration for the `scrooge` binary.
//! Configuration is loaded from TOML files and parsed using serde.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [ledger]
/// genesis_path = "data/genesis.json"
/// batches_path = "data/batches.json"
/// output_path = "data/pool.json"
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the ledger state comes from and goes to
///
/// # Fields
/// - `genesis_path`: JSON pool snapshot the first epoch is validated against
/// - `batches_path`: JSON list of batches, processed as consecutive epochs
/// - `output_path`: where the final pool snapshot is written
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub genesis_path: PathBuf,
    pub batches_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The configured log level, falling back to INFO on unknown names
    pub fn log_level(&self) -> tracing::Level {
        self.logging.level.parse().unwrap_or(tracing::Level::INFO)
    }
}
