#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the LA crime dashboard.
//!
//! Serves chart-ready JSON for the trend and map views. Handlers share a
//! single [`RecordCache`] snapshot over the `SQLite` record store; the
//! snapshot is reloaded through `POST /api/refresh` after an ingestion
//! run.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use la_crime_database::cache::RecordCache;
use la_crime_database::store::SqliteRecordStore;
use la_crime_database::{DbError, RecordStore};

/// Errors that can occur while starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Opening or reading the record store failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Binding or running the HTTP server failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Snapshot of stored incidents shared by all workers.
    pub records: Arc<RecordCache>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            records: Arc::new(RecordCache::new(store)),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/crime-types", web::get().to(handlers::crime_types))
            .route("/trend", web::get().to(handlers::trend))
            .route("/map", web::get().to(handlers::map))
            .route("/refresh", web::post().to(handlers::refresh)),
    );
}

/// Starts the dashboard API server.
///
/// Opens the record store named by `LA_CRIME_DB_PATH`, loads the initial
/// snapshot, and serves on `BIND_ADDR`:`PORT`. The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the store cannot be opened or the HTTP server
/// fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    log::info!("Opening record store...");
    let store = SqliteRecordStore::open_from_env().await?;

    let state = web::Data::new(AppState::new(Arc::new(store)));

    match state.records.fetch_all(true).await? {
        Some(snapshot) => log::info!("Loaded {} records", snapshot.len()),
        None => log::warn!("Record store is empty; run `la_crime_ingest load` to populate it"),
    }

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
