//! Command implementations for the vitals CLI

mod check;
mod import;
mod report;
mod status;

pub use check::check;
pub use import::{import, init};
pub use report::{markers, nutrition, sleep};
pub use status::status;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config;
use crate::error::{Result, VitalsError};
use crate::Database;

/// Resolve the database path, falling back to the default location
pub(crate) fn resolve_db_path(db: Option<String>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(PathBuf::from(path)),
        None => config::default_db_path(),
    }
}

/// Open (creating if needed) the database at the resolved path
pub(crate) fn open_db(db: Option<String>) -> Result<Database> {
    let path = resolve_db_path(db)?;
    if let Some(parent) = path.parent() {
        config::ensure_dir(parent)?;
    }
    Database::open(path)
}

/// Parse a YYYY-MM-DD argument
pub(crate) fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| VitalsError::InvalidDateFormat(s.to_string()))
}

/// Parse an optional date-range bound
pub(crate) fn parse_day_opt(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(parse_day).transpose()
}

/// Render an optional value for a table cell
pub(crate) fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}

/// Day portion of a stored timestamp string
pub(crate) fn day_of(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}
