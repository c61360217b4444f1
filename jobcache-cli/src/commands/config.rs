//! Print the effective configuration.

use std::path::Path;

use anyhow::Result;

use super::load_config;

pub fn run_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    print!("{}", config.redacted().to_toml()?);
    Ok(())
}
