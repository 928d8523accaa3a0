//! In-process record store.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use la_crime_incident_models::IncidentRecord;

use crate::{DbError, RecordStore};

/// Record store holding incidents in memory. Used by tests and by callers
/// that never persist.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<IncidentRecord>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: Vec<IncidentRecord>) -> Self {
        Self {
            records: Mutex::new(dedupe(records.iter())),
        }
    }
}

fn dedupe<'a>(records: impl Iterator<Item = &'a IncidentRecord>) -> Vec<IncidentRecord> {
    let mut seen = BTreeSet::new();
    records
        .filter(|r| seen.insert(r.report_id.clone()))
        .cloned()
        .collect()
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_all(&self) -> Result<Vec<IncidentRecord>, DbError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.clone())
    }

    async fn replace_all(&self, records: &[IncidentRecord]) -> Result<u64, DbError> {
        let unique = dedupe(records.iter());
        let stored = unique.len() as u64;
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = unique;
        Ok(stored)
    }

    async fn count(&self) -> Result<u64, DbError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn rec(id: &str, category: &str) -> IncidentRecord {
        IncidentRecord {
            report_id: id.to_string(),
            arrest_date: NaiveDate::from_ymd_opt(2019, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            category: Some(category.to_string()),
            area_description: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn replace_discards_previous_contents() {
        let store = MemoryRecordStore::with_records(vec![rec("1", "Homicide")]);
        assert_eq!(store.count().await.unwrap(), 1);

        store
            .replace_all(&[rec("2", "Robbery"), rec("3", "Arson")])
            .await
            .unwrap();

        let ids: Vec<String> = store
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.report_id)
            .collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn replace_with_empty_clears() {
        let store = MemoryRecordStore::with_records(vec![rec("1", "Homicide")]);
        assert_eq!(store.replace_all(&[]).await.unwrap(), 0);
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicates_keep_first_occurrence() {
        let store = MemoryRecordStore::new();
        let stored = store
            .replace_all(&[rec("1", "Homicide"), rec("1", "Robbery")])
            .await
            .unwrap();
        assert_eq!(stored, 1);
        assert_eq!(
            store.fetch_all().await.unwrap()[0].category(),
            Some("Homicide")
        );
    }
}
