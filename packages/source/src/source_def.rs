//! Config-driven incident source definition.
//!
//! [`SourceDefinition`] captures everything unique about a data source in a
//! serializable config struct: where to fetch from and which raw fields map
//! onto [`IncidentRecord`]. A single generic implementation handles
//! normalization for every source.

use std::collections::BTreeSet;

use async_trait::async_trait;
use la_crime_incident_models::{IncidentRecord, RawLocation};
use serde::Deserialize;

use crate::parsing::parse_socrata_date;
use crate::socrata::{SocrataConfig, fetch_socrata};
use crate::{CrimeSource, FetchOptions, SourceError};

// ── Top-level source definition ──────────────────────────────────────────

/// A complete, config-driven incident source definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"la_arrests"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable data portal page, if any.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// How to fetch raw data from the API.
    pub fetcher: FetcherConfig,
    /// Field name mappings for normalization.
    pub fields: FieldMapping,
}

/// How to fetch raw data from the source API.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// Socrata SODA API (`$limit/$offset/$order/$where`).
    Socrata {
        /// Resource URL.
        api_url: String,
        /// Date column for ordering and filtering.
        date_column: String,
        /// Records per page.
        page_size: u64,
    },
}

/// Raw field names for each [`IncidentRecord`] attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Unique report identifier field.
    pub report_id: String,
    /// Arrest timestamp field.
    pub arrest_date: String,
    /// Category / charge group description field.
    pub category: String,
    /// Area name field.
    pub area_description: String,
    /// Nested `{ latitude, longitude }` location field.
    pub location: String,
}

impl SourceDefinition {
    /// Parses a definition from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the TOML is malformed or missing
    /// required keys.
    pub fn from_toml(toml_str: &str) -> Result<Self, SourceError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Returns the source identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalizes a single raw row. Returns `None` when the row has no
    /// report id or no parseable arrest date.
    #[must_use]
    pub fn normalize_record(&self, raw: &serde_json::Value) -> Option<IncidentRecord> {
        let fields = &self.fields;

        let report_id = match raw.get(&fields.report_id)? {
            serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };

        let arrest_date = raw
            .get(&fields.arrest_date)
            .and_then(serde_json::Value::as_str)
            .and_then(parse_socrata_date)?;

        let location = raw
            .get(&fields.location)
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value::<RawLocation>(v.clone()).ok());

        Some(IncidentRecord {
            report_id,
            arrest_date,
            category: string_field(raw, &fields.category),
            area_description: string_field(raw, &fields.area_description),
            location,
        })
    }

    /// Normalizes a page of raw rows, dropping rows that cannot be
    /// normalized and keeping only the first occurrence of each report id.
    #[must_use]
    pub fn normalize_records(&self, raw: &[serde_json::Value]) -> Vec<IncidentRecord> {
        let mut seen = BTreeSet::new();
        let mut incidents = Vec::with_capacity(raw.len());
        let mut skipped = 0usize;
        let mut duplicates = 0usize;

        for row in raw {
            let Some(record) = self.normalize_record(row) else {
                skipped += 1;
                continue;
            };
            if !seen.insert(record.report_id.clone()) {
                duplicates += 1;
                continue;
            }
            incidents.push(record);
        }

        if skipped > 0 || duplicates > 0 {
            log::warn!(
                "{}: skipped {skipped} unparseable and {duplicates} duplicate rows",
                self.id
            );
        }
        log::info!(
            "{}: normalized {} incidents from {} raw records",
            self.id,
            incidents.len(),
            raw.len()
        );

        incidents
    }
}

fn string_field(raw: &serde_json::Value, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[async_trait]
impl CrimeSource for SourceDefinition {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, options: &FetchOptions) -> Result<Vec<IncidentRecord>, SourceError> {
        let raw = match &self.fetcher {
            FetcherConfig::Socrata {
                api_url,
                date_column,
                page_size,
            } => {
                fetch_socrata(
                    &SocrataConfig {
                        api_url,
                        date_column,
                        label: &self.name,
                        page_size: *page_size,
                    },
                    options,
                )
                .await?
            }
        };

        Ok(self.normalize_records(&raw))
    }
}
