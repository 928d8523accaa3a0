//! Database connection utilities.

use std::path::{Path, PathBuf};

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Default location of the incident database, relative to the working
/// directory.
pub const DEFAULT_DB_PATH: &str = "data/la_crime.db";

/// Returns the database path from the `LA_CRIME_DB_PATH` environment
/// variable, falling back to [`DEFAULT_DB_PATH`].
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    std::env::var("LA_CRIME_DB_PATH")
        .map_or_else(|_| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from)
}

/// Opens (or creates) the `SQLite` database at `path`, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`DbError`] if the directory cannot be created or the database
/// cannot be opened.
pub fn connect(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    log::debug!("Opening incident database at {}", path.display());

    init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection {
        message: format!("{}: {e}", path.display()),
    })
}

/// Opens the database named by `LA_CRIME_DB_PATH`.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened.
pub fn connect_from_env() -> Result<Box<dyn Database>, DbError> {
    connect(&db_path_from_env())
}
