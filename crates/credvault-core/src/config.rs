//! Configuration for the account store and service.
//!
//! Configuration is read from a JSON file and can be overridden from the
//! environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `CREDVAULT_DATABASE_PATH` | `store.database_path` |
//! | `CREDVAULT_MAX_CONNECTIONS` | `store.max_connections` |
//! | `CREDVAULT_ACQUIRE_TIMEOUT_SECS` | `store.acquire_timeout_secs` |
//! | `CREDVAULT_REJECT_UNMATCHED_UPDATES` | `service.reject_unmatched_updates` |
//! | `CREDVAULT_REQUEST_TIMEOUT_MS` | `service.request_timeout_ms` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const ENV_DATABASE_PATH: &str = "CREDVAULT_DATABASE_PATH";
const ENV_MAX_CONNECTIONS: &str = "CREDVAULT_MAX_CONNECTIONS";
const ENV_ACQUIRE_TIMEOUT_SECS: &str = "CREDVAULT_ACQUIRE_TIMEOUT_SECS";
const ENV_REJECT_UNMATCHED_UPDATES: &str = "CREDVAULT_REJECT_UNMATCHED_UPDATES";
const ENV_REQUEST_TIMEOUT_MS: &str = "CREDVAULT_REQUEST_TIMEOUT_MS";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`Config`].
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting or override has a value that cannot be parsed or is out of range.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Name of the variable.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub store: StoreConfig,
    /// Service behavior.
    pub service: ServiceOptions,
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// out-of-range value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable or out-of-range
    /// value.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    fn apply_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            self.store.database_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_MAX_CONNECTIONS) {
            let max_connections: u32 = parse(ENV_MAX_CONNECTIONS, value.clone())?;
            if max_connections == 0 {
                return Err(ConfigError::InvalidValue {
                    key: ENV_MAX_CONNECTIONS,
                    value,
                });
            }
            self.store.max_connections = max_connections;
        }
        if let Some(value) = lookup(ENV_ACQUIRE_TIMEOUT_SECS) {
            self.store.acquire_timeout_secs = parse(ENV_ACQUIRE_TIMEOUT_SECS, value)?;
        }
        if let Some(value) = lookup(ENV_REJECT_UNMATCHED_UPDATES) {
            self.service.reject_unmatched_updates = parse(ENV_REJECT_UNMATCHED_UPDATES, value)?;
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            self.service.request_timeout_ms = Some(parse(ENV_REQUEST_TIMEOUT_MS, value)?);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check values that deserialize but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `store.max_connections` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "store.max_connections",
                value: self.store.max_connections.to_string(),
            });
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

/// Account store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the `SQLite` database file.
    pub database_path: PathBuf,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Seconds to wait for a free connection.
    pub acquire_timeout_secs: u64,
}

impl StoreConfig {
    /// Default settings pointing at the given database file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: path.into(),
            ..Self::default()
        }
    }

    /// Default database location: `<data dir>/credvault/accounts.db`.
    #[must_use]
    pub fn default_database_path() -> PathBuf {
        dirs::data_dir().map_or_else(
            || PathBuf::from("accounts.db"),
            |dir| dir.join("credvault").join("accounts.db"),
        )
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: Self::default_database_path(),
            max_connections: 5,
            acquire_timeout_secs: 30,
        }
    }
}

/// Account service behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOptions {
    /// Report an update that matched no row as `NotFound` instead of success.
    pub reject_unmatched_updates: bool,
    /// Deadline applied to calls that arrive without one, in milliseconds.
    pub request_timeout_ms: Option<u64>,
}

impl ServiceOptions {
    /// The default request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
