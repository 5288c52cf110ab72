//! Configuration structures.
//!
//! Configuration is loaded from an optional JSON file and then overridden by
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::errors::{Error, Result};

/// Global configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Tool record store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Outbound HTTP configuration.
    #[serde(default)]
    pub http: HttpConfig,

    /// Response mapping configuration.
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply `TOOLGATE_*` environment overrides.
    ///
    /// - `TOOLGATE_DB_PATH`: store path
    /// - `TOOLGATE_INVOKE_TIMEOUT_SECS`: invocation timeout in seconds
    /// - `TOOLGATE_PROBE_TIMEOUT_SECS`: probe timeout in seconds
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(path) = std::env::var("TOOLGATE_DB_PATH") {
            if !path.is_empty() {
                self.store.path = PathBuf::from(path);
            }
        }
        if let Some(secs) = env_secs("TOOLGATE_INVOKE_TIMEOUT_SECS")? {
            self.http.invoke_timeout = secs;
        }
        if let Some(secs) = env_secs("TOOLGATE_PROBE_TIMEOUT_SECS")? {
            self.http.probe_timeout = secs;
        }
        Ok(self)
    }
}

fn env_secs(var: &str) -> Result<Option<Duration>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| Error::validation(format!("{} must be a whole number of seconds", var))),
        Err(_) => Ok(None),
    }
}

/// Tool record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file. The parent directory is created on open.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tmp/tools.db"),
        }
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for normal tool invocations.
    #[serde(with = "humantime_serde")]
    pub invoke_timeout: Duration,

    /// Timeout for connectivity probes. Kept shorter so probe latency is
    /// bounded independently of call latency.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,

    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            invoke_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(10),
            user_agent: format!("toolgate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Response mapping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Maximum number of list elements rendered (truncation, no pagination).
    pub max_items: usize,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self { max_items: 10 }
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
