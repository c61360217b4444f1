//! jobcache-server: HTTP lookups over an in-memory table snapshot
//!
//! Loads the `company` and `recruit` tables into a [`jobcache_core::Snapshot`]
//! at startup, serves point lookups and full listings from it, and rebuilds it
//! on demand through the admin endpoint.

pub mod db;
pub mod http;
pub mod loader;
pub mod state;

pub use db::{create_pool, DbError, PgSource, RecordSource};
pub use http::{build_router, run_server, ApiError, ServerConfig, ServerError};
pub use loader::SnapshotLoader;
pub use state::AppState;
