/// Structured error types for quicknote-core.
///
/// Library consumers get structured errors; the CLI wraps them in `anyhow`.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("Failed to read config file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// Config file is not valid TOML for our schema
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Required setting absent from both file and environment
    #[error("Missing required setting '{key}' (set {env} or add it to the config file)")]
    Missing { key: &'static str, env: &'static str },

    /// Setting present but unusable
    #[error("Invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn missing(key: &'static str, env: &'static str) -> Self {
        Self::Missing { key, env }
    }

    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}
