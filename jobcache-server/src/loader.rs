//! Snapshot loader - reads both tables and builds a fresh [`Snapshot`].
//!
//! Loading never touches the published snapshot; [`crate::AppState`] decides
//! whether to swap the result in.

use std::sync::Arc;
use std::time::Instant;

use jobcache_core::{Snapshot, SnapshotBuilder};

use crate::db::{DbError, RecordSource};

pub struct SnapshotLoader {
    source: Arc<dyn RecordSource>,
    excluded_columns: Vec<String>,
}

impl SnapshotLoader {
    pub fn new(source: Arc<dyn RecordSource>, excluded_columns: Vec<String>) -> Self {
        Self {
            source,
            excluded_columns,
        }
    }

    pub fn source(&self) -> &Arc<dyn RecordSource> {
        &self.source
    }

    /// Read everything and build a complete snapshot, or fail without side effects.
    pub async fn load(&self) -> Result<Snapshot, DbError> {
        let started = Instant::now();
        let mut builder = SnapshotBuilder::new(self.excluded_columns.clone());

        tracing::debug!("loading company rows");
        builder.extend_companies(self.source.companies().await?);

        tracing::debug!("loading recruitment rows");
        builder.extend_recruitments(self.source.recruitments().await?);

        let snapshot = builder.build();
        let counts = snapshot.counts();
        tracing::info!(
            companies = counts.companies,
            company_rows = snapshot.companies().len(),
            recruitments = counts.recruitments,
            recruitment_rows = snapshot.recruitments().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snapshot loaded"
        );

        Ok(snapshot)
    }
}
