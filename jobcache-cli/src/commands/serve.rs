//! HTTP server command
//!
//! Loads the snapshot before binding; a failed initial load aborts startup.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use jobcache_core::Config;
use jobcache_server::{create_pool, run_server, AppState, PgSource, ServerConfig};

use super::{apply_database_url, load_config};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides config/environment)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides config/environment)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

impl ServeArgs {
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        apply_database_url(config, self.database_url)?;
        config.validate().context("Invalid configuration")
    }
}

fn resolve_bind_addr(config: &Config) -> Result<SocketAddr> {
    let target = (config.server.host.as_str(), config.server.port);
    target
        .to_socket_addrs()
        .with_context(|| format!("Failed to resolve bind address {}", config.bind_addr()))?
        .next()
        .with_context(|| format!("No usable address for {}", config.bind_addr()))
}

/// Run the HTTP server
pub async fn run_serve(config_path: Option<&Path>, args: ServeArgs) -> Result<()> {
    let mut config = load_config(config_path)?;
    args.apply(&mut config)?;
    let bind_addr = resolve_bind_addr(&config)?;

    tracing::info!(
        database = %config.database.label(),
        max_connections = config.database.max_connections(),
        "Starting jobcache server"
    );

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    let state = AppState::new(
        Arc::new(PgSource::new(pool.clone())),
        config.cache.excluded_column_substrings.clone(),
    );

    tracing::info!("Loading data into memory snapshot");
    let counts = state
        .reload()
        .await
        .context("Initial snapshot load failed")?;
    tracing::info!(
        companies = counts.companies,
        recruitments = counts.recruitments,
        "Ready to serve requests"
    );

    // Run server (blocks until shutdown)
    let result = run_server(state, ServerConfig { bind_addr })
        .await
        .context("Server error");

    pool.close().await;
    tracing::info!("Database pool closed");

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let args = ServeArgs {
            host: Some("127.0.0.1".into()),
            port: Some(9100),
            database_url: Some("postgres://localhost/datn".into()),
        };

        args.apply(&mut config).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/datn")
        );
        assert_eq!(resolve_bind_addr(&config).unwrap().port(), 9100);
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = Config::default();
        let args = ServeArgs {
            host: None,
            port: Some(0),
            database_url: None,
        };
        assert!(args.apply(&mut config).is_err());
    }
}
