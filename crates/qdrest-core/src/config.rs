//! Client configuration
//!
//! Resolved once when a client is built; the client keeps its own copy, so
//! later changes to the environment or the file do not affect it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default Qdrant REST endpoint
pub const DEFAULT_HOST: &str = "http://localhost:6333";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for a Qdrant REST endpoint
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://localhost:6333`
    pub host: String,

    /// Sent as the `api-key` header when set and non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Applied to every request; 0 disables the timeout
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// API key, treating an empty string the same as no key
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Request timeout, `None` when `timeout_secs` is 0
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Load configuration from environment variables
    ///
    /// Reads `QDRANT_HOST`, `QDRANT_API_KEY` and `QDRANT_TIMEOUT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file; missing keys take their defaults
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Apply environment variables on top of this configuration
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(host) = std::env::var("QDRANT_HOST") {
            self.host = host;
        }
        if let Ok(key) = std::env::var("QDRANT_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(timeout) = std::env::var("QDRANT_TIMEOUT") {
            self.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "QDRANT_TIMEOUT".to_string(),
                    value: timeout,
                })?;
        }

        Ok(self)
    }

    /// Render the default configuration as a TOML document
    pub fn default_toml() -> String {
        format!(
            "# Qdrant REST client configuration\n\
             # Environment variables QDRANT_HOST, QDRANT_API_KEY and QDRANT_TIMEOUT override these.\n\
             host = \"{DEFAULT_HOST}\"\n\
             # api_key = \"\"\n\
             timeout_secs = {DEFAULT_TIMEOUT_SECS}\n"
        )
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Failed to write config file {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
