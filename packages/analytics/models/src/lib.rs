#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation parameter and result types.
//!
//! Defines the inputs and outputs of the two dashboard aggregations: the
//! top-category monthly time series and the classified map point layer.
//! All result types are request-scoped views derived from a record
//! snapshot and are never persisted.

use chrono::{Datelike as _, Months, NaiveDate, NaiveDateTime};
use la_crime_incident_models::CrimeType;
use serde::{Deserialize, Serialize};

/// Number of categories charted when the caller does not ask otherwise.
pub const DEFAULT_TOP_N: usize = 5;

/// A calendar month, represented by its first day.
///
/// Used as the time half of a (category, month) bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// Returns the month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Returns the month containing `dt`.
    #[must_use]
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self::from_date(dt.date())
    }

    /// Returns the first day of this month.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.0
    }

    /// Returns the following calendar month, or `None` past the end of the
    /// representable range.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// Returns the calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the month number (1-12).
    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Parameters for the top-category monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesParams {
    /// Any date in the first month of the range.
    pub start: NaiveDate,
    /// Any date in the last month of the range (inclusive).
    pub end: NaiveDate,
    /// Whether the chart stacks its series. Carried through untouched.
    pub stack: bool,
    /// Number of most frequent categories to chart.
    pub top_n: usize,
}

impl SeriesParams {
    /// Creates unstacked parameters charting [`DEFAULT_TOP_N`] categories.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            stack: false,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Sets the stacking flag.
    #[must_use]
    pub const fn with_stack(mut self, stack: bool) -> Self {
        self.stack = stack;
        self
    }

    /// Sets the number of categories to chart.
    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Incident count for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    /// First day of the month.
    pub month: NaiveDate,
    /// Number of incidents in the month.
    pub count: u64,
}

/// Monthly counts for a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeries {
    /// Category label.
    pub category: String,
    /// One entry per month in range, in calendar order.
    pub points: Vec<MonthCount>,
}

impl CategorySeries {
    /// Sum of all monthly counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.count).sum()
    }
}

/// Result of the top-category monthly series aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySeries {
    /// Whether the chart should stack its series.
    pub stacked: bool,
    /// One series per selected category, most frequent first.
    pub series: Vec<CategorySeries>,
}

impl MonthlySeries {
    /// Returns `true` when no category was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Looks up the series for a category.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&CategorySeries> {
        self.series.iter().find(|s| s.category == category)
    }

    /// Returns the selected categories in rank order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.category.as_str()).collect()
    }
}

/// Parameters for the map point layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapParams {
    /// First calendar date included.
    pub start_date: NaiveDate,
    /// Last calendar date included.
    pub end_date: NaiveDate,
    /// Crime type to keep.
    pub crime_type: CrimeType,
}

/// A single incident positioned on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Source report identifier.
    pub report_id: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Category label.
    pub category: String,
    /// Area name, used as the map color dimension.
    pub area_description: Option<String>,
}
