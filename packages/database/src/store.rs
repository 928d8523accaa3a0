//! `SQLite`-backed record store.
//!
//! Each incident is kept as a JSON document keyed by `report_id`. Every
//! [`RecordStore::replace_all`] call writes its batch under a fresh
//! *generation* and then flips `store_meta.active_generation` with a single
//! `UPDATE`, so readers see either the old batch or the new one, never an
//! empty or half-written store. Inactive generations are deleted after the
//! flip.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use async_trait::async_trait;
use la_crime_incident_models::IncidentRecord;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::{DbError, RecordStore, db};

/// Bound parameters per incident row.
const PARAMS_PER_ROW: usize = 4;

/// Rows per multi-row `INSERT`, kept under `SQLite`'s default limit of 999
/// bound parameters.
const INSERT_CHUNK_ROWS: usize = 200;

/// Record store persisted in `SQLite` through `switchy_database`.
pub struct SqliteRecordStore {
    db: Box<dyn Database>,
}

impl SqliteRecordStore {
    /// Wraps an open connection, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if schema creation fails.
    pub async fn new(db: Box<dyn Database>) -> Result<Self, DbError> {
        ensure_schema(db.as_ref()).await?;
        Ok(Self { db })
    }

    /// Opens the database at `path` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or initialized.
    pub async fn open(path: &Path) -> Result<Self, DbError> {
        Self::new(db::connect(path)?).await
    }

    /// Opens the database named by `LA_CRIME_DB_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or initialized.
    pub async fn open_from_env() -> Result<Self, DbError> {
        Self::new(db::connect_from_env()?).await
    }

    async fn active_generation(&self) -> Result<i64, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT active_generation FROM store_meta WHERE id = 1",
                &[],
            )
            .await?;

        let row = rows.first().ok_or_else(|| DbError::Conversion {
            message: "store_meta row is missing".to_string(),
        })?;

        row.to_value("active_generation")
            .map_err(|e| DbError::Conversion {
                message: format!("Failed to parse active generation: {e}"),
            })
    }

    async fn next_generation(&self) -> Result<i64, DbError> {
        let active = self.active_generation().await?;
        let rows = self
            .db
            .query_raw_params("SELECT MAX(generation) AS max_generation FROM incidents", &[])
            .await?;
        let max_stored: Option<i64> = match rows.first() {
            Some(row) => row.to_value("max_generation").unwrap_or(None),
            None => None,
        };

        Ok(active.max(max_stored.unwrap_or(0)) + 1)
    }

    async fn insert_chunk(
        &self,
        generation: i64,
        chunk: &[&IncidentRecord],
    ) -> Result<u64, DbError> {
        let mut sql = String::from(
            "INSERT INTO incidents (generation, report_id, arrest_date, document) VALUES ",
        );
        let mut params = Vec::with_capacity(chunk.len() * PARAMS_PER_ROW);

        for (i, record) in chunk.iter().enumerate() {
            let base = i * PARAMS_PER_ROW;
            if i > 0 {
                sql.push_str(", ");
            }
            write!(
                sql,
                "(${}, ${}, ${}, ${})",
                base + 1,
                base + 2,
                base + 3,
                base + 4
            )
            .map_err(|e| DbError::Conversion {
                message: format!("Failed to build insert statement: {e}"),
            })?;

            params.push(DatabaseValue::Int64(generation));
            params.push(DatabaseValue::String(record.report_id.clone()));
            params.push(DatabaseValue::String(
                record.arrest_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            ));
            params.push(DatabaseValue::String(serde_json::to_string(record)?));
        }

        sql.push_str(" ON CONFLICT (generation, report_id) DO NOTHING");

        Ok(self.db.exec_raw_params(&sql, &params).await?)
    }
}

/// Creates the incident tables if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS store_meta (
            id                INTEGER PRIMARY KEY CHECK (id = 1),
            active_generation INTEGER NOT NULL
        )",
    )
    .await?;

    db.exec_raw(
        "INSERT INTO store_meta (id, active_generation) VALUES (1, 0)
         ON CONFLICT (id) DO NOTHING",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS incidents (
            generation  INTEGER NOT NULL,
            report_id   TEXT NOT NULL,
            arrest_date TEXT NOT NULL,
            document    TEXT NOT NULL,
            PRIMARY KEY (generation, report_id)
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_incidents_generation_date
         ON incidents (generation, arrest_date)",
    )
    .await?;

    Ok(())
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn fetch_all(&self) -> Result<Vec<IncidentRecord>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT report_id, document FROM incidents
                 WHERE generation = (SELECT active_generation FROM store_meta WHERE id = 1)
                 ORDER BY arrest_date, report_id",
                &[],
            )
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        let mut undecodable = 0usize;

        for row in &rows {
            let document: String = row.to_value("document").unwrap_or_default();
            match serde_json::from_str::<IncidentRecord>(&document) {
                Ok(record) => records.push(record),
                Err(e) => {
                    undecodable += 1;
                    let report_id: String = row.to_value("report_id").unwrap_or_default();
                    log::debug!("Skipping undecodable incident {report_id}: {e}");
                }
            }
        }

        if undecodable > 0 {
            log::warn!("Skipped {undecodable} undecodable stored incidents");
        }

        Ok(records)
    }

    async fn replace_all(&self, records: &[IncidentRecord]) -> Result<u64, DbError> {
        let generation = self.next_generation().await?;

        let mut seen = BTreeSet::new();
        let unique: Vec<&IncidentRecord> = records
            .iter()
            .filter(|r| seen.insert(r.report_id.as_str()))
            .collect();

        log::info!(
            "Writing {} incidents to generation {generation}",
            unique.len()
        );

        let mut stored = 0u64;
        for chunk in unique.chunks(INSERT_CHUNK_ROWS) {
            stored += self.insert_chunk(generation, chunk).await?;
        }

        self.db
            .exec_raw_params(
                "UPDATE store_meta SET active_generation = $1 WHERE id = 1",
                &[DatabaseValue::Int64(generation)],
            )
            .await?;

        let removed = self
            .db
            .exec_raw_params(
                "DELETE FROM incidents WHERE generation <> $1",
                &[DatabaseValue::Int64(generation)],
            )
            .await?;

        log::info!("Activated generation {generation} ({stored} incidents, {removed} replaced)");

        Ok(stored)
    }

    async fn count(&self) -> Result<u64, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT COUNT(*) AS cnt FROM incidents
                 WHERE generation = (SELECT active_generation FROM store_meta WHERE id = 1)",
                &[],
            )
            .await?;

        let count: i64 = match rows.first() {
            Some(row) => row.to_value("cnt").unwrap_or(0),
            None => 0,
        };

        u64::try_from(count).map_err(|e| DbError::Conversion {
            message: format!("Negative incident count {count}: {e}"),
        })
    }
}
