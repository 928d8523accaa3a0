#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for the crime dashboard.
//!
//! Turns a snapshot of [`IncidentRecord`]s into the two views the
//! presentation layer charts:
//!
//! - [`series::top_category_monthly_series`]: month-bucketed counts for the
//!   most frequent categories.
//! - [`map::classify_and_filter_map_points`]: date-filtered, crime-type
//!   classified points with usable coordinates.
//!
//! Every function here is a pure, synchronous transform over its input.
//! Missing data yields empty results, never errors.
//!
//! [`IncidentRecord`]: la_crime_incident_models::IncidentRecord

pub mod map;
pub mod series;

pub use map::classify_and_filter_map_points;
pub use series::{month_range, top_categories, top_category_monthly_series};
