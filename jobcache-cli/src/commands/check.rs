//! One-off load: probe the database, build a snapshot, print counts as JSON.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use jobcache_server::{create_pool, PgSource, RecordSource, SnapshotLoader};

use super::{apply_database_url, load_config};

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run_check(config_path: Option<&Path>, args: CheckArgs) -> Result<()> {
    let mut config = load_config(config_path)?;
    apply_database_url(&mut config, args.database_url)?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;
    let source = Arc::new(PgSource::new(pool.clone()));

    source.ping().await.context("Database probe failed")?;

    let loader = SnapshotLoader::new(source, config.cache.excluded_column_substrings.clone());
    let snapshot = loader.load().await.context("Snapshot load failed")?;
    pool.close().await;

    let counts = snapshot.counts();
    let report = json!({
        "database": config.database.label(),
        "company_rows": snapshot.companies().len(),
        "companies_keyed": counts.companies,
        "recruitment_rows": snapshot.recruitments().len(),
        "recruitments_keyed": counts.recruitments,
        "loaded_at": snapshot.loaded_at().map(|t| t.to_rfc3339()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
