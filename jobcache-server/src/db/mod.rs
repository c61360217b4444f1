//! Database layer - connection pool, row decoding and the record source
//!
//! - Bounded pool with pre-acquire validation, sized `pool_size + max_overflow`
//! - Full-table reads only, decoded column by column into `CellValue`s
//! - [`RecordSource`] is the seam the loader reads through

pub mod decode;
pub mod pool;
pub mod source;

pub use pool::{connect_options, create_pool, pool_options};
pub use source::{PgSource, RecordSource};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("failed to decode column '{column}': {reason}")]
    Decode { column: String, reason: String },
}

impl DbError {
    pub fn decode(column: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            column: column.into(),
            reason: reason.to_string(),
        }
    }
}
