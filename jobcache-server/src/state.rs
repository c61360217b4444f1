//! Application state shared across handlers
//!
//! The published snapshot sits behind an `ArcSwap`. Readers take one `Arc`
//! per request and see a single consistent snapshot for its whole duration;
//! a reload builds the replacement off to the side and swaps it in only when
//! complete.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;

use jobcache_core::{Snapshot, SnapshotCounts};

use crate::db::{DbError, RecordSource};
use crate::loader::SnapshotLoader;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    loader: SnapshotLoader,
    snapshot: ArcSwap<Snapshot>,
    // one reload at a time; readers never take this
    reload_lock: Mutex<()>,
}

impl AppState {
    /// State with an empty snapshot; call [`AppState::reload`] to populate it.
    pub fn new(source: Arc<dyn RecordSource>, excluded_columns: Vec<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                loader: SnapshotLoader::new(source, excluded_columns),
                snapshot: ArcSwap::from_pointee(Snapshot::empty()),
                reload_lock: Mutex::new(()),
            }),
        }
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.load_full()
    }

    /// Rebuild the snapshot from the source and publish it.
    ///
    /// On failure the previous snapshot stays published.
    pub async fn reload(&self) -> Result<SnapshotCounts, DbError> {
        let _guard = self.inner.reload_lock.lock().await;

        match self.inner.loader.load().await {
            Ok(snapshot) => {
                let counts = snapshot.counts();
                self.inner.snapshot.store(Arc::new(snapshot));
                Ok(counts)
            }
            Err(e) => {
                tracing::warn!(error = %e, "reload failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    /// Connectivity probe against the backing database.
    pub async fn ping(&self) -> Result<(), DbError> {
        self.inner.loader.source().ping().await
    }
}
