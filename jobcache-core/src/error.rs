//! Structured error types for jobcache-core.
//!
//! Library code returns `CacheError`; the CLI wraps it in `anyhow` with context.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// Config file could not be read
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    /// Config file is not valid TOML for [`crate::Config`]
    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Environment override has a value of the wrong type
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: String,
        value: String,
        reason: String,
    },

    /// Configuration is readable but unusable
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

pub type Result<T> = std::result::Result<T, CacheError>;

impl CacheError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn invalid_env(
        var: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEnv {
            var: var.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::config("database name is empty");
        assert_eq!(err.to_string(), "Configuration error: database name is empty");

        let err = CacheError::invalid_env("JOBCACHE_PORT", "http", "invalid digit found in string");
        assert!(err.to_string().contains("JOBCACHE_PORT"));
        assert!(err.to_string().contains("'http'"));
    }
}
