//! Layered configuration for the jobcache service.
//!
//! Precedence, lowest first: built-in defaults, TOML file, environment
//! variables. CLI flags are applied on top by the binary.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8008
//!
//! [database]
//! host = "db.internal"
//! name = "datn"
//! user = "postgres"
//! password = "secret"
//! pool_size = 5
//! max_overflow = 10
//!
//! [cache]
//! excluded_column_substrings = ["quality", "updated_at"]
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

const REDACTED: &str = "********";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8008,
        }
    }
}

/// Database connection and pool settings.
///
/// When `url` is set it wins over the individual parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: Option<String>,
    /// Connections kept open
    pub pool_size: u32,
    /// Extra connections allowed under load, on top of `pool_size`
    pub max_overflow: u32,
    /// Validate a connection before handing it out
    pub pre_ping: bool,
    /// Longest a caller waits for a free connection
    pub pool_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: None,
            pool_size: 5,
            max_overflow: 10,
            pre_ping: true,
            pool_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    pub fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow).max(1)
    }

    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_secs)
    }

    /// Short human-readable target for logs, never includes credentials.
    pub fn label(&self) -> String {
        match &self.url {
            Some(_) => "database from url".to_string(),
            None => format!("{}@{}:{}", self.name, self.host, self.port),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Company columns whose name contains any of these are not loaded
    pub excluded_column_substrings: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            excluded_column_substrings: vec!["quality".to_string(), "updated_at".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from an optional file and the process environment.
    ///
    /// With `path = None` the file is looked up via `JOBCACHE_CONFIG`, then
    /// `~/.jobcache/config.toml`; a missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|var| env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CacheError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| CacheError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `$JOBCACHE_CONFIG` or `~/.jobcache/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        env::var_os("JOBCACHE_CONFIG")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".jobcache/config.toml")))
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = lookup("JOBCACHE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "JOBCACHE_PORT")? {
            self.server.port = port;
        }

        let db = &mut self.database;
        if let Some(host) = lookup("JOBCACHE_DB_HOST") {
            db.host = host;
        }
        if let Some(port) = parse_var(&lookup, "JOBCACHE_DB_PORT")? {
            db.port = port;
        }
        if let Some(name) = lookup("JOBCACHE_DB_NAME") {
            db.name = name;
        }
        if let Some(user) = lookup("JOBCACHE_DB_USER") {
            db.user = user;
        }
        if let Some(password) = lookup("JOBCACHE_DB_PASSWORD") {
            db.password = Some(password);
        }
        if let Some(size) = parse_var(&lookup, "JOBCACHE_POOL_SIZE")? {
            db.pool_size = size;
        }
        if let Some(overflow) = parse_var(&lookup, "JOBCACHE_MAX_OVERFLOW")? {
            db.max_overflow = overflow;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(CacheError::config("server port must be non-zero"));
        }

        let db = &self.database;
        match &db.url {
            Some(url) if url.trim().is_empty() => {
                Err(CacheError::config("database url is empty"))
            }
            Some(_) => Ok(()),
            None if db.name.trim().is_empty() => {
                Err(CacheError::config("database name is empty"))
            }
            None if db.port == 0 => Err(CacheError::config("database port must be non-zero")),
            None => Ok(()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Copy with credentials masked, for printing.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.database.password.is_some() {
            copy.database.password = Some(REDACTED.to_string());
        }
        if copy.database.url.is_some() {
            copy.database.url = Some(REDACTED.to_string());
        }
        copy
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CacheError::config(format!("failed to serialize config: {e}")))
    }
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| CacheError::invalid_env(var, raw.clone(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_match_deployment() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8008");
        assert_eq!(config.database.max_connections(), 15);
        assert!(config.database.pre_ping);
        assert_eq!(config.database.pool_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.cache.excluded_column_substrings,
            vec!["quality", "updated_at"]
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [server]
            port = 9000

            [database]
            host = "db.internal"
            name = "datn"
            max_overflow = 0
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.max_connections(), 5);
        assert_eq!(config.database.label(), "datn@db.internal:5432");
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CacheError::ConfigParse { .. }));
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::default();
        config
            .apply_env(env_of(&[
                ("JOBCACHE_PORT", "8100"),
                ("JOBCACHE_DB_NAME", "datn"),
                ("JOBCACHE_DB_PASSWORD", "pw"),
                ("JOBCACHE_POOL_SIZE", "2"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8100);
        assert_eq!(config.database.name, "datn");
        assert_eq!(config.database.password.as_deref(), Some("pw"));
        assert_eq!(config.database.max_connections(), 12);
    }

    #[test]
    fn bad_env_value_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(env_of(&[("JOBCACHE_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidEnv { ref var, .. } if var == "JOBCACHE_PORT"));
    }

    #[test]
    fn validation_catches_unusable_settings() {
        let mut config = Config::default();
        config.database.name = " ".into();
        assert!(config.validate().is_err());

        // a url makes the parts irrelevant
        config.database.url = Some("postgres://localhost/datn".into());
        assert!(config.validate().is_ok());

        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn redaction_hides_credentials() {
        let mut config = Config::default();
        config.database.password = Some("hunter2".into());
        config.database.url = Some("postgres://u:hunter2@h/db".into());

        let printed = config.redacted().to_toml().unwrap();
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains(REDACTED));
    }
}
