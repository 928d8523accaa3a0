#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the LA crime dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the aggregation result types to allow independent evolution of the
//! API contract.

use chrono::NaiveDate;
use la_crime_analytics_models::{MapParams, MapPoint, MonthlySeries, SeriesParams};
use la_crime_incident_models::CrimeType;
use serde::{Deserialize, Serialize};

/// Line colors assigned to trend series in rank order.
pub const COLORS: [&str; 5] = [
    "rgb(67,67,67)",
    "rgb(115,115,115)",
    "rgb(49,130,189)",
    "rgb(189,189,189)",
    "rgb(240,240,240)",
];

/// Title of the trend chart.
pub const TREND_TITLE: &str = "Crime incidences of each charge group";

/// Suffix appended to [`TREND_TITLE`] when the series are stacked.
pub const STACKED_SUFFIX: &str = " [Stacked]";

/// Title of the map layer.
pub const MAP_TITLE: &str = "Crime map";

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Returns the color for the series at `rank`, cycling through
/// [`COLORS`].
#[must_use]
pub const fn series_color(rank: usize) -> &'static str {
    COLORS[rank % COLORS.len()]
}

/// Server health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// A selectable crime type for the map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCrimeTypeOption {
    /// Wire value (`violent` / `non_violent`).
    pub value: CrimeType,
    /// Display label.
    pub label: String,
}

impl From<CrimeType> for ApiCrimeTypeOption {
    fn from(crime_type: CrimeType) -> Self {
        Self {
            value: crime_type,
            label: crime_type.label().to_string(),
        }
    }
}

/// Query parameters for the trend endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendQueryParams {
    /// Any date in the first charted month.
    pub from: Option<NaiveDate>,
    /// Any date in the last charted month.
    pub to: Option<NaiveDate>,
    /// Stack the series.
    pub stack: Option<bool>,
    /// Number of categories to chart.
    pub top_n: Option<usize>,
}

impl TrendQueryParams {
    /// Resolves missing parameters to the dashboard defaults
    /// (2018-12 through 2019-08, unstacked, top 5).
    #[must_use]
    pub fn resolve(&self) -> SeriesParams {
        let params = SeriesParams::new(
            self.from.unwrap_or_else(|| ymd(2018, 12, 1)),
            self.to.unwrap_or_else(|| ymd(2019, 8, 1)),
        )
        .with_stack(self.stack.unwrap_or(false));

        match self.top_n {
            Some(n) => params.with_top_n(n),
            None => params,
        }
    }
}

/// Query parameters for the map endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQueryParams {
    /// First calendar date included.
    pub from: Option<NaiveDate>,
    /// Last calendar date included.
    pub to: Option<NaiveDate>,
    /// Crime type to plot.
    pub crime_type: Option<CrimeType>,
}

impl MapQueryParams {
    /// Resolves missing parameters to the dashboard defaults
    /// (November 2019, non-violent).
    #[must_use]
    pub fn resolve(&self) -> MapParams {
        MapParams {
            start_date: self.from.unwrap_or_else(|| ymd(2019, 11, 1)),
            end_date: self.to.unwrap_or_else(|| ymd(2019, 11, 30)),
            crime_type: self.crime_type.unwrap_or_default(),
        }
    }
}

/// One line on the trend chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrendSeries {
    /// Category label.
    pub name: String,
    /// Line color.
    pub color: String,
    /// Incident count per month, aligned with [`ApiTrendChart::months`].
    pub counts: Vec<u64>,
    /// Sum of `counts`.
    pub total: u64,
}

/// Chart-ready payload for the trend view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrendChart {
    /// Chart title, suffixed with [`STACKED_SUFFIX`] when stacked.
    pub title: String,
    /// Horizontal axis label.
    pub x_axis_title: String,
    /// Vertical axis label.
    pub y_axis_title: String,
    /// Whether the series are drawn stacked.
    pub stacked: bool,
    /// First day of each charted month.
    pub months: Vec<NaiveDate>,
    /// One line per category, most frequent first.
    pub series: Vec<ApiTrendSeries>,
}

impl From<&MonthlySeries> for ApiTrendChart {
    fn from(result: &MonthlySeries) -> Self {
        let mut title = TREND_TITLE.to_string();
        if result.stacked {
            title.push_str(STACKED_SUFFIX);
        }

        let months = result
            .series
            .first()
            .map(|s| s.points.iter().map(|p| p.month).collect())
            .unwrap_or_default();

        let series = result
            .series
            .iter()
            .enumerate()
            .map(|(rank, s)| ApiTrendSeries {
                name: s.category.clone(),
                color: series_color(rank).to_string(),
                counts: s.points.iter().map(|p| p.count).collect(),
                total: s.total(),
            })
            .collect();

        Self {
            title,
            x_axis_title: "Date".to_string(),
            y_axis_title: "Number of Crimes".to_string(),
            stacked: result.stacked,
            months,
            series,
        }
    }
}

/// Points for the crime map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapLayer {
    /// Map title.
    pub title: String,
    /// Crime type the points were filtered to.
    pub crime_type: CrimeType,
    /// First calendar date included.
    pub from: NaiveDate,
    /// Last calendar date included.
    pub to: NaiveDate,
    /// Distinct area names in first-seen order, for the color legend.
    pub areas: Vec<String>,
    /// Points to plot, in snapshot order.
    pub points: Vec<MapPoint>,
}

impl ApiMapLayer {
    /// Builds the layer for `params` from the filtered points.
    #[must_use]
    pub fn new(params: &MapParams, points: Vec<MapPoint>) -> Self {
        let mut areas: Vec<String> = Vec::new();
        for area in points.iter().filter_map(|p| p.area_description.as_deref()) {
            if !areas.iter().any(|a| a == area) {
                areas.push(area.to_string());
            }
        }

        Self {
            title: MAP_TITLE.to_string(),
            crime_type: params.crime_type,
            from: params.start_date,
            to: params.end_date,
            areas,
            points,
        }
    }
}

/// Result of reloading the record snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRefresh {
    /// Number of records in the new snapshot.
    pub records: u64,
}
