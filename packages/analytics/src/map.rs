//! Crime-type classified map points.

use la_crime_analytics_models::{MapParams, MapPoint};
use la_crime_incident_models::IncidentRecord;

/// Selects the incidents to plot on the crime map.
///
/// Uncategorized records are dropped before classification. A record is
/// kept when its arrest falls on a calendar date in
/// `[params.start_date, params.end_date]` and its derived crime type equals
/// `params.crime_type`. Records without usable coordinates are dropped.
/// Output preserves input order.
#[must_use]
pub fn classify_and_filter_map_points(
    records: &[IncidentRecord],
    params: &MapParams,
) -> Vec<MapPoint> {
    let mut missing_coordinates = 0usize;

    let points: Vec<MapPoint> = records
        .iter()
        .filter(|r| r.crime_type() == Some(params.crime_type))
        .filter(|r| {
            let day = r.arrest_date.date();
            day >= params.start_date && day <= params.end_date
        })
        .filter_map(|r| {
            let Some((latitude, longitude)) = r.coordinates() else {
                missing_coordinates += 1;
                return None;
            };
            Some(MapPoint {
                report_id: r.report_id.clone(),
                latitude,
                longitude,
                category: r.category().unwrap_or_default().to_string(),
                area_description: r.area_description.clone(),
            })
        })
        .collect();

    if missing_coordinates > 0 {
        log::debug!("Dropped {missing_coordinates} map candidates without usable coordinates");
    }

    points
}
