//! Configuration structures.
//!
//! Configuration is embedded-host friendly: everything has a sensible default
//! and the whole tree can be loaded from a JSON file.

use crate::types::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Tool discovery configuration.
    #[serde(default)]
    pub plugins: PluginConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Background job configuration.
    #[serde(default)]
    pub jobs: JobConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Tool discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Root directory scanned for `<category>/<tool>/manifest.json`.
    pub root: PathBuf,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("plugins"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Background job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// How long a new submission waits for the previous worker to finish
    /// before detaching it and proceeding.
    #[serde(with = "humantime_serde")]
    pub retire_timeout: Duration,

    /// Poll interval used while waiting on a retiring worker.
    #[serde(with = "humantime_serde")]
    pub retire_poll_interval: Duration,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            retire_timeout: Duration::from_secs(5),
            retire_poll_interval: Duration::from_millis(10),
        }
    }
}
