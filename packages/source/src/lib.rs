#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Remote incident sources and the Socrata fetcher.
//!
//! Each data provider implements the [`CrimeSource`] trait to define how raw
//! records are fetched from the remote API and normalized into
//! [`IncidentRecord`]s. Sources are described by TOML configs embedded at
//! compile time (see [`registry`]).

pub mod parsing;
pub mod registry;
pub mod retry;
pub mod socrata;
pub mod source_def;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use la_crime_incident_models::IncidentRecord;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Source config could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Data normalization error.
    #[error("Normalization error: {message}")]
    Normalization {
        /// Description of what went wrong.
        message: String,
    },
}

/// Configuration for fetching data from a source.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Only fetch records at or after this timestamp.
    pub since: Option<NaiveDateTime>,
    /// Maximum number of records to fetch.
    pub limit: Option<u64>,
}

/// Trait that all incident sources must implement.
#[async_trait]
pub trait CrimeSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g., `"la_arrests"`).
    fn id(&self) -> &str;

    /// Returns the human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetches every record matching `options` and normalizes it into
    /// canonical incidents. Rows that cannot be normalized are dropped;
    /// the returned batch is deduplicated by report id.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the remote fetch fails.
    async fn fetch(&self, options: &FetchOptions) -> Result<Vec<IncidentRecord>, SourceError>;
}
