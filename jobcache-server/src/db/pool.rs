//! Database connection pool management
//!
//! Uses sqlx PgPool. The pool keeps `pool_size` connections warm and grows to
//! `pool_size + max_overflow` under load; callers beyond that wait up to
//! `pool_timeout_secs` for a connection instead of failing immediately.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use jobcache_core::DatabaseConfig;

use super::DbError;

/// Create a PostgreSQL connection pool from configuration.
///
/// # Errors
///
/// Returns an error if the connection options are invalid or the first
/// connection cannot be established.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database).await?;
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let options = connect_options(config)?;
    let pool = pool_options(config).connect_with(options).await?;
    Ok(pool)
}

/// Pool sizing and validation settings.
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    let max = config.max_connections();

    PgPoolOptions::new()
        .min_connections(config.pool_size.min(max))
        .max_connections(max)
        .test_before_acquire(config.pre_ping)
        .acquire_timeout(config.pool_timeout())
}

/// Connection target, from the URL when present, otherwise from the parts.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DbError> {
    if let Some(url) = &config.url {
        return Ok(url.parse::<PgConnectOptions>()?);
    }

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user);

    if let Some(password) = &config.password {
        options = options.password(password);
    }

    Ok(options)
}
