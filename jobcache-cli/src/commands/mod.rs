//! Command implementations for the jobcache CLI

pub mod check;
pub mod config;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use jobcache_core::Config;

pub use check::run_check;
pub use config::run_config;
pub use serve::run_serve;

/// Load configuration from file and environment.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load configuration")
}

/// Override the configured database URL when one was passed on the command line.
pub(crate) fn apply_database_url(config: &mut Config, url: Option<String>) -> Result<()> {
    if let Some(url) = url {
        config.database.url = Some(url);
        config.validate().context("Invalid configuration")?;
    }
    Ok(())
}
