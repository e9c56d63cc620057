//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold remote API, cache and storage settings used by core services.
//! - Load settings from a JSON file with per-field defaults.
//!
//! # Invariants
//! - `api_base_url` is an absolute `http`/`https` URL.
//! - `cache_ttl_secs` and `request_timeout_secs` are positive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

/// Default remote API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.learnhub.co.ke/v1";
/// Default freshness window for cached curriculum lists (24h).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DB_FILE_NAME: &str = "learnhub.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read config `{path}`: {source}"),
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid config `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub api_base_url: String,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub db_file_name: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses config JSON; missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                message: format!("expected absolute http(s) url, got `{url}`"),
            });
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_secs",
                message: "must be positive".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                message: "must be positive".to_string(),
            });
        }
        let file_name = self.db_file_name.trim();
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                field: "db_file_name",
                message: format!("expected a bare file name, got `{file_name}`"),
            });
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
