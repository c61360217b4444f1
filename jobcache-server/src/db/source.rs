//! Record source - where snapshot rows come from.

use async_trait::async_trait;
use sqlx::PgPool;

use jobcache_core::Row;

use super::decode::decode_row;
use super::DbError;

const COMPANY_QUERY: &str = "SELECT * FROM company";
const RECRUITMENT_QUERY: &str = "SELECT * FROM recruit WHERE media_internal_id IS NOT NULL";

/// Full-table reads of both tables plus a connectivity probe.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every company row, unfiltered.
    async fn companies(&self) -> Result<Vec<Row>, DbError>;

    /// Every recruitment row with a non-null `media_internal_id`.
    async fn recruitments(&self) -> Result<Vec<Row>, DbError>;

    /// Cheapest possible round trip to the database.
    async fn ping(&self) -> Result<(), DbError>;
}

/// PostgreSQL-backed source.
#[derive(Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<Row>, DbError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }
}

#[async_trait]
impl RecordSource for PgSource {
    async fn companies(&self) -> Result<Vec<Row>, DbError> {
        self.fetch(COMPANY_QUERY).await
    }

    async fn recruitments(&self) -> Result<Vec<Row>, DbError> {
        self.fetch(RECRUITMENT_QUERY).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        let _: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
