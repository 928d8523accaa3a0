#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record schema and crime type classification.
//!
//! This crate defines the shape of a single arrest incident as it is held
//! in the record store, along with the binary violent / non-violent
//! classification used by the map layer. Loosely-typed source fields
//! (nested coordinates, optional category) are coerced here so that
//! downstream code never has to guess at their shape.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category labels that classify an incident as [`CrimeType::Violent`].
pub const VIOLENT_CATEGORIES: &[&str] = &["Homicide", "Aggravated Assault", "Weapon (carry/poss)"];

/// Derived binary classification of an incident's category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CrimeType {
    /// Homicide, aggravated assault and weapon offenses
    Violent,
    /// Every other categorized incident
    #[default]
    NonViolent,
}

impl CrimeType {
    /// Classifies a category label.
    ///
    /// Returns `None` for a missing category: uncategorized incidents are
    /// neither violent nor non-violent.
    #[must_use]
    pub fn classify(category: Option<&str>) -> Option<Self> {
        let category = category?;
        if VIOLENT_CATEGORIES.contains(&category) {
            Some(Self::Violent)
        } else {
            Some(Self::NonViolent)
        }
    }

    /// Returns the human-readable label shown in selectors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Violent => "Violent Crimes",
            Self::NonViolent => "Non-Violent Crimes",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::NonViolent, Self::Violent]
    }
}

/// A single coordinate as delivered by the source, either a JSON string
/// (Socrata's default) or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    /// Numeric coordinate.
    Number(f64),
    /// Textual coordinate, parsed on demand.
    Text(String),
}

impl CoordinateValue {
    /// Coerces the value to a finite `f64`.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Nested location object attached to an incident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    /// Latitude (WGS84), possibly textual.
    #[serde(default)]
    pub latitude: Option<CoordinateValue>,
    /// Longitude (WGS84), possibly textual.
    #[serde(default)]
    pub longitude: Option<CoordinateValue>,
}

impl RawLocation {
    /// Builds a location from numeric coordinates.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(CoordinateValue::Number(latitude)),
            longitude: Some(CoordinateValue::Number(longitude)),
        }
    }

    /// Returns `(latitude, longitude)` when both coordinates coerce to
    /// finite numbers.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude = self.latitude.as_ref()?.to_f64()?;
        let longitude = self.longitude.as_ref()?.to_f64()?;
        Some((latitude, longitude))
    }
}

/// One arrest incident as held in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Source report identifier, unique within the store.
    pub report_id: String,
    /// When the arrest occurred.
    pub arrest_date: NaiveDateTime,
    /// Charge group description (e.g. `"Narcotic Drug Laws"`).
    #[serde(default)]
    pub category: Option<String>,
    /// Police area name (e.g. `"Central"`).
    #[serde(default)]
    pub area_description: Option<String>,
    /// Nested coordinates.
    #[serde(default)]
    pub location: Option<RawLocation>,
}

impl IncidentRecord {
    /// Returns the category, if present.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the derived crime type, or `None` for uncategorized records.
    #[must_use]
    pub fn crime_type(&self) -> Option<CrimeType> {
        CrimeType::classify(self.category())
    }

    /// Returns `(latitude, longitude)` if the record carries usable
    /// coordinates.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location.as_ref()?.coordinates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: Option<&str>) -> IncidentRecord {
        IncidentRecord {
            report_id: "1".to_string(),
            arrest_date: chrono::NaiveDate::from_ymd_opt(2019, 11, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            category: category.map(ToString::to_string),
            area_description: None,
            location: None,
        }
    }

    #[test]
    fn classifies_violent_categories() {
        for cat in VIOLENT_CATEGORIES {
            assert_eq!(CrimeType::classify(Some(cat)), Some(CrimeType::Violent));
        }
        assert_eq!(
            CrimeType::classify(Some("Narcotic Drug Laws")),
            Some(CrimeType::NonViolent)
        );
    }

    #[test]
    fn missing_category_is_unclassified() {
        assert_eq!(CrimeType::classify(None), None);
        assert_eq!(record(None).crime_type(), None);
    }

    #[test]
    fn empty_category_is_still_categorized() {
        assert_eq!(record(Some("")).category(), Some(""));
        assert_eq!(record(Some("")).crime_type(), Some(CrimeType::NonViolent));
    }

    #[test]
    fn crime_type_wire_names() {
        assert_eq!(CrimeType::Violent.to_string(), "violent");
        assert_eq!(CrimeType::NonViolent.as_ref(), "non_violent");
        assert_eq!("non_violent".parse::<CrimeType>().unwrap(), CrimeType::NonViolent);
        assert!("dangerous".parse::<CrimeType>().is_err());
        assert_eq!(
            serde_json::to_string(&CrimeType::NonViolent).unwrap(),
            "\"non_violent\""
        );
    }

    #[test]
    fn coerces_textual_coordinates() {
        let location: RawLocation =
            serde_json::from_str(r#"{"latitude": "34.0522", "longitude": "-118.2437"}"#).unwrap();
        let (lat, lon) = location.coordinates().unwrap();
        assert!((lat - 34.0522).abs() < f64::EPSILON);
        assert!((lon - -118.2437).abs() < f64::EPSILON);
    }

    #[test]
    fn coerces_numeric_coordinates() {
        let location: RawLocation =
            serde_json::from_str(r#"{"latitude": 34.1, "longitude": -118.3}"#).unwrap();
        assert!(location.coordinates().is_some());
    }

    #[test]
    fn rejects_malformed_coordinates() {
        let location: RawLocation =
            serde_json::from_str(r#"{"latitude": "n/a", "longitude": "-118.2"}"#).unwrap();
        assert!(location.coordinates().is_none());

        let location: RawLocation = serde_json::from_str(r#"{"longitude": "-118.2"}"#).unwrap();
        assert!(location.coordinates().is_none());

        assert!(RawLocation::new(f64::NAN, -118.2).coordinates().is_none());
    }

    #[test]
    fn zero_coordinates_are_numeric() {
        assert_eq!(
            RawLocation::new(0.0, -118.2).coordinates(),
            Some((0.0, -118.2))
        );
        assert_eq!(RawLocation::new(0.0, 0.0).coordinates(), Some((0.0, 0.0)));
    }

    #[test]
    fn record_deserializes_without_optional_fields() {
        let rec: IncidentRecord = serde_json::from_str(
            r#"{"report_id": "190512345", "arrest_date": "2019-11-05T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(rec.report_id, "190512345");
        assert!(rec.category.is_none());
        assert!(rec.coordinates().is_none());
    }
}
