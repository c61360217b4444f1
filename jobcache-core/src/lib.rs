//! jobcache-core: in-memory snapshot model for company and recruitment records
//!
//! Provides everything the server needs that does not touch the network:
//! - Typed cell values and the sanitizer that turns them into JSON
//! - Record keying and column exclusion
//! - The immutable [`Snapshot`] and its builder
//! - Layered configuration (defaults, TOML file, environment)

pub mod config;
pub mod error;
pub mod record;
pub mod snapshot;
pub mod value;

pub use config::{CacheConfig, Config, DatabaseConfig, ServerSection};
pub use error::{CacheError, Result};
pub use record::{
    exclude_columns, record_key, Record, Row, COMPANY_KEY, NULL_MARKER, RECRUITMENT_KEY,
};
pub use snapshot::{RecruitmentDetail, Snapshot, SnapshotBuilder, SnapshotCounts};
pub use value::{sanitize, sanitize_row, CellValue};
