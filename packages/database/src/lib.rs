#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record store for crime incidents.
//!
//! The [`RecordStore`] trait is the only way the ingestion job and the
//! server touch persisted incidents: a full-snapshot read and a bulk
//! replace. Callers receive the store as an explicit dependency rather than
//! reaching for a process-wide connection.
//!
//! - [`store::SqliteRecordStore`] persists incidents with `switchy_database`
//!   on `SQLite`.
//! - [`memory::MemoryRecordStore`] keeps them in process.
//! - [`cache::RecordCache`] layers a shared, explicitly refreshed snapshot
//!   on top of any store.

pub mod cache;
pub mod db;
pub mod memory;
pub mod store;

use async_trait::async_trait;
use la_crime_incident_models::IncidentRecord;

/// Errors that can occur during record store operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Stored document could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (creating the data directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening the database failed.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Canonical storage for incident records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every stored record. An empty vector means no data has been
    /// loaded yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    async fn fetch_all(&self) -> Result<Vec<IncidentRecord>, DbError>;

    /// Replaces the entire contents of the store with `records`.
    ///
    /// Records sharing a `report_id` with an earlier record in the batch
    /// are dropped. Returns the number of records stored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails. The previous contents remain
    /// visible in that case.
    async fn replace_all(&self, records: &[IncidentRecord]) -> Result<u64, DbError>;

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    async fn count(&self) -> Result<u64, DbError>;
}
