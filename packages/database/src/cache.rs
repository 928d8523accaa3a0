//! Shared record snapshot.
//!
//! Request handlers read the same immutable snapshot through an [`Arc`].
//! The snapshot is loaded from the backing [`RecordStore`] on first use and
//! afterwards only when the caller opts out of the cached copy or after an
//! explicit [`RecordCache::refresh`].

use std::sync::Arc;

use la_crime_incident_models::IncidentRecord;
use tokio::sync::RwLock;

use crate::{DbError, RecordStore};

/// An immutable, shareable set of incident records.
pub type Snapshot = Arc<Vec<IncidentRecord>>;

/// Read-through cache over a [`RecordStore`].
pub struct RecordCache {
    store: Arc<dyn RecordStore>,
    snapshot: RwLock<Option<Snapshot>>,
}

impl RecordCache {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(None),
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Returns the current snapshot.
    ///
    /// With `allow_cached`, a previously loaded snapshot is returned as-is.
    /// Otherwise the store is re-read. `None` means the store holds no
    /// records.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    pub async fn fetch_all(&self, allow_cached: bool) -> Result<Option<Snapshot>, DbError> {
        if allow_cached && let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Some(Arc::clone(snapshot)));
        }

        self.refresh().await
    }

    /// Re-reads the store and replaces the cached snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read. The previous
    /// snapshot is kept in that case.
    pub async fn refresh(&self) -> Result<Option<Snapshot>, DbError> {
        let records = self.store.fetch_all().await?;
        let mut guard = self.snapshot.write().await;

        if records.is_empty() {
            log::debug!("Record store is empty");
            *guard = None;
            return Ok(None);
        }

        log::debug!("Loaded snapshot of {} records", records.len());
        let snapshot = Arc::new(records);
        *guard = Some(Arc::clone(&snapshot));
        Ok(Some(snapshot))
    }

    /// Drops the cached snapshot so the next read goes to the store.
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
    }
}
