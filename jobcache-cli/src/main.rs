//! jobcache CLI - in-memory company/recruitment lookup service
//!
//! Subcommands:
//! - `serve`: load both tables and run the HTTP API
//! - `check`: load once, print counts, exit (connectivity and data smoke test)
//! - `config`: print the effective configuration with secrets masked

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "jobcache",
    author,
    version,
    about = "Serve company and recruitment records from an in-memory snapshot",
    long_about = "Loads the company and recruit tables from PostgreSQL into memory at startup \
                  and answers key lookups and full listings over HTTP. The snapshot is \
                  replaced atomically when POST /admin/reload-cache is called."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Path to a TOML config file
    #[arg(long, short = 'c', global = true, env = "JOBCACHE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Load the snapshot once and print record counts
    Check(commands::check::CheckArgs),
    /// Print the effective configuration (passwords masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(config_path, args).await?,
        Commands::Check(args) => commands::run_check(config_path, args).await?,
        Commands::Config => commands::run_config(config_path)?,
    }
    Ok(())
}
