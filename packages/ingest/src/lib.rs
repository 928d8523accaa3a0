#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for loading incident records from a remote source into the
//! record store.
//!
//! A load is a full refresh: every record from the start date forward is
//! fetched, then the store's contents are replaced in one step. The store
//! is only touched once the fetch has completed.

use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use la_crime_database::{DbError, RecordStore};
use la_crime_source::source_def::SourceDefinition;
use la_crime_source::{CrimeSource, FetchOptions, SourceError};

/// Start of the default ingestion window, in the format accepted by
/// `--start-date`.
pub const DEFAULT_START_DATE: &str = "2018-01-01T00:00:00.000";

/// Errors that can occur while running an ingestion job.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Fetching from the remote source failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Writing to the record store failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// No source is registered under the requested id.
    #[error("Unknown source: {id}")]
    UnknownSource {
        /// The requested source id.
        id: String,
    },

    /// The start date could not be parsed.
    #[error("Invalid start date: {value}")]
    InvalidStartDate {
        /// The rejected input.
        value: String,
    },
}

/// Outcome of a completed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Source the records came from.
    pub source_id: String,
    /// Normalized records returned by the source.
    pub fetched: u64,
    /// Records now in the store.
    pub stored: u64,
    /// Wall-clock duration of the load.
    pub elapsed: Duration,
}

/// Returns all configured data sources from the TOML registry.
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    la_crime_source::registry::all_sources()
}

/// Looks up the source registered under `id`.
///
/// # Errors
///
/// Returns [`IngestError::UnknownSource`] if no source has that id.
pub fn resolve_source(id: &str) -> Result<SourceDefinition, IngestError> {
    la_crime_source::registry::find_source(id).ok_or_else(|| {
        log::warn!(
            "No source {id:?}. Available: {}",
            all_sources()
                .iter()
                .map(|s| s.id().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        IngestError::UnknownSource { id: id.to_string() }
    })
}

/// Parses a `--start-date` value (date-time or bare date).
///
/// # Errors
///
/// Returns [`IngestError::InvalidStartDate`] if `value` is not a
/// recognized date.
pub fn parse_start_date(value: &str) -> Result<NaiveDateTime, IngestError> {
    la_crime_source::parsing::parse_start_date(value).ok_or_else(|| {
        IngestError::InvalidStartDate {
            value: value.to_string(),
        }
    })
}

/// Fetches every record at or after `since` from `source` and replaces the
/// contents of `store` with them.
///
/// If the fetch fails the store is left untouched.
///
/// # Errors
///
/// Returns [`IngestError`] if fetching or storing fails.
pub async fn load(
    store: &dyn RecordStore,
    source: &dyn CrimeSource,
    since: NaiveDateTime,
    limit: Option<u64>,
) -> Result<LoadSummary, IngestError> {
    let start = Instant::now();
    log::info!(
        "Loading {} ({}) from {since}{}",
        source.name(),
        source.id(),
        limit.map_or_else(String::new, |l| format!(" (limit {l})"))
    );

    let options = FetchOptions {
        since: Some(since),
        limit,
    };

    let records = source.fetch(&options).await.inspect_err(|e| {
        log::error!("Fetch failed for {}, store unchanged: {e}", source.id());
    })?;
    let fetched = records.len() as u64;

    if records.is_empty() {
        log::warn!("{}: source returned no records", source.id());
    }

    let stored = store.replace_all(&records).await?;

    let summary = LoadSummary {
        source_id: source.id().to_string(),
        fetched,
        stored,
        elapsed: start.elapsed(),
    };

    log::info!(
        "Load complete for {}: {} stored ({} fetched), took {:.1}s",
        source.name(),
        summary.stored,
        summary.fetched,
        summary.elapsed.as_secs_f64()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use la_crime_database::memory::MemoryRecordStore;
    use la_crime_incident_models::IncidentRecord;

    use super::*;

    fn rec(id: &str, day: u32) -> IncidentRecord {
        IncidentRecord {
            report_id: id.to_string(),
            arrest_date: NaiveDate::from_ymd_opt(2019, 3, day)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            category: Some("Robbery".to_string()),
            area_description: Some("Newton".to_string()),
            location: None,
        }
    }

    fn since() -> NaiveDateTime {
        parse_start_date(DEFAULT_START_DATE).unwrap()
    }

    struct FakeSource {
        records: Vec<IncidentRecord>,
        fail: bool,
        seen: Mutex<Option<FetchOptions>>,
    }

    impl FakeSource {
        fn new(records: Vec<IncidentRecord>) -> Self {
            Self {
                records,
                fail: false,
                seen: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Vec::new())
            }
        }
    }

    #[async_trait]
    impl CrimeSource for FakeSource {
        fn id(&self) -> &str {
            "fake"
        }

        fn name(&self) -> &str {
            "Fake Source"
        }

        async fn fetch(
            &self,
            options: &FetchOptions,
        ) -> Result<Vec<IncidentRecord>, SourceError> {
            *self.seen.lock().unwrap() = Some(options.clone());
            if self.fail {
                return Err(SourceError::Normalization {
                    message: "connection reset".to_string(),
                });
            }
            Ok(self.records.clone())
        }
    }

    #[tokio::test]
    async fn load_replaces_store_contents() {
        let store = MemoryRecordStore::with_records(vec![rec("old", 1)]);
        let source = FakeSource::new(vec![rec("1", 2), rec("2", 3)]);

        let summary = load(&store, &source, since(), None).await.unwrap();

        assert_eq!(summary.source_id, "fake");
        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.stored, 2);

        let ids: Vec<String> = store
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.report_id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_store_unchanged() {
        let store = MemoryRecordStore::with_records(vec![rec("old", 1)]);
        let source = FakeSource::failing();

        let err = load(&store, &source, since(), None).await.unwrap_err();
        assert!(matches!(err, IngestError::Source(_)));

        let records = store.fetch_all().await.unwrap();
        assert_eq!(records, vec![rec("old", 1)]);
    }

    #[tokio::test]
    async fn passes_window_and_limit_to_source() {
        let store = MemoryRecordStore::new();
        let source = FakeSource::new(vec![rec("1", 2)]);

        load(&store, &source, since(), Some(10)).await.unwrap();

        let seen = source.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.since, Some(since()));
        assert_eq!(seen.limit, Some(10));
    }

    #[tokio::test]
    async fn duplicate_ids_are_stored_once() {
        let store = MemoryRecordStore::new();
        let source = FakeSource::new(vec![rec("1", 2), rec("1", 3)]);

        let summary = load(&store, &source, since(), None).await.unwrap();
        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.stored, 1);
    }

    #[test]
    fn default_start_date_parses() {
        let dt = since();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    }

    #[test]
    fn bad_start_date_is_rejected() {
        assert!(matches!(
            parse_start_date("last tuesday"),
            Err(IngestError::InvalidStartDate { .. })
        ));
    }

    #[test]
    fn unknown_source_is_an_error() {
        assert!(matches!(
            resolve_source("nowhere"),
            Err(IngestError::UnknownSource { .. })
        ));
        assert_eq!(resolve_source("la_arrests").unwrap().id(), "la_arrests");
    }
}
