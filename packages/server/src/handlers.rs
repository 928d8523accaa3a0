//! HTTP handler functions for the LA crime dashboard API.

use actix_web::{HttpResponse, web};
use la_crime_analytics::{classify_and_filter_map_points, top_category_monthly_series};
use la_crime_analytics_models::MonthlySeries;
use la_crime_incident_models::CrimeType;
use la_crime_server_models::{
    ApiCrimeTypeOption, ApiHealth, ApiMapLayer, ApiRefresh, ApiTrendChart, MapQueryParams,
    TrendQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/crime-types`
///
/// Returns the options for the map's crime type selector.
pub async fn crime_types() -> HttpResponse {
    let options: Vec<ApiCrimeTypeOption> = CrimeType::all()
        .iter()
        .copied()
        .map(ApiCrimeTypeOption::from)
        .collect();

    HttpResponse::Ok().json(options)
}

/// `GET /api/trend`
///
/// Monthly counts for the most frequent categories. An empty store yields
/// a chart with no series.
pub async fn trend(
    state: web::Data<AppState>,
    params: web::Query<TrendQueryParams>,
) -> HttpResponse {
    let params = params.resolve();

    match state.records.fetch_all(true).await {
        Ok(snapshot) => {
            let result = snapshot.map_or_else(
                || MonthlySeries {
                    stacked: params.stack,
                    series: Vec::new(),
                },
                |records| top_category_monthly_series(&records, &params),
            );
            HttpResponse::Ok().json(ApiTrendChart::from(&result))
        }
        Err(e) => {
            log::error!("Failed to load records for trend: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load records"
            }))
        }
    }
}

/// `GET /api/map`
///
/// Points of the selected crime type within the date range. An empty store
/// yields no points.
pub async fn map(state: web::Data<AppState>, params: web::Query<MapQueryParams>) -> HttpResponse {
    let params = params.resolve();

    match state.records.fetch_all(true).await {
        Ok(snapshot) => {
            let points = snapshot
                .map(|records| classify_and_filter_map_points(&records, &params))
                .unwrap_or_default();
            HttpResponse::Ok().json(ApiMapLayer::new(&params, points))
        }
        Err(e) => {
            log::error!("Failed to load records for map: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load records"
            }))
        }
    }
}

/// `POST /api/refresh`
///
/// Reloads the record snapshot from the store.
pub async fn refresh(state: web::Data<AppState>) -> HttpResponse {
    match state.records.refresh().await {
        Ok(snapshot) => {
            let records = snapshot.map_or(0, |s| s.len() as u64);
            log::info!("Snapshot refreshed: {records} records");
            HttpResponse::Ok().json(ApiRefresh { records })
        }
        Err(e) => {
            log::error!("Failed to refresh records: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to refresh records"
            }))
        }
    }
}
