//! Status command

use crate::error::Result;
use crate::Database;

use super::resolve_db_path;

/// Show row counts for the imported tables
pub fn status(db_path: Option<String>) -> Result<()> {
    let path = resolve_db_path(db_path)?;

    if !path.exists() {
        println!("No database found at: {}", path.display());
        println!("Run 'vitals import <export.json>' to create one.");
        return Ok(());
    }

    let db = Database::open(&path)?;
    let counts = db.counts()?;

    println!("Database: {}", path.display());
    println!();
    println!("Data stored:");
    println!("  Dimensions (date, source): {:>8}", counts.dimensions);
    println!("  Metrics cataloged:         {:>8}", counts.metrics);
    println!("  Raw facts:                 {:>8}", counts.raw_facts);
    println!("  Sleep sessions:            {:>8}", counts.sleep_sessions);
    println!("  Nutrition days:            {:>8}", counts.nutrition_days);
    println!("  Health-marker days:        {:>8}", counts.health_marker_days);

    Ok(())
}
