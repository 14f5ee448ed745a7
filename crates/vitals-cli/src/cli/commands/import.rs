//! Import and init commands

use crate::config;
use crate::error::Result;
use crate::export::HealthExport;
use crate::import::ImportEngine;
use crate::Database;

use super::{parse_day_opt, resolve_db_path};

/// Import a health export JSON file
pub fn import(file: String, date: Option<String>, db_path: Option<String>) -> Result<()> {
    let day = parse_day_opt(date.as_deref())?;

    // load before touching the database so a missing file imports nothing
    let export = HealthExport::load(&file)?;

    let path = resolve_db_path(db_path)?;
    if let Some(parent) = path.parent() {
        config::ensure_dir(parent)?;
    }
    println!("Using database: {}", path.display());
    let db = Database::open(&path)?;

    match day {
        Some(day) => println!("Importing {} (entries on {} only)", file, day),
        None => println!("Importing {}", file),
    }

    let stats = ImportEngine::new(&db).run(export, day)?;
    println!("Import complete: {}", stats);

    Ok(())
}

/// Create the database and schema without importing anything
pub fn init(db_path: Option<String>) -> Result<()> {
    let path = resolve_db_path(db_path)?;
    if let Some(parent) = path.parent() {
        config::ensure_dir(parent)?;
    }
    Database::open(&path)?;
    println!("Database ready at {}", path.display());
    Ok(())
}
