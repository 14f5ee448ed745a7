//! Export-file duplicate scan
//!
//! Reads an export document and reports entries that repeat the same
//! (date, source, qty) key within one stream. Read-only; never touches the
//! database.

use std::collections::HashSet;

use crate::error::Result;
use crate::export::HealthExport;

/// Scan an export file for intra-stream duplicate entries
pub fn check(file: String) -> Result<()> {
    let export = HealthExport::load(&file)?;

    let mut total = 0usize;
    for stream in &export.data.metrics {
        let mut seen = HashSet::new();
        let mut duplicates = 0usize;

        for entry in &stream.data {
            // f64 is not hashable; compare quantities bit-for-bit
            let key = (
                entry.date.clone(),
                entry.source.clone(),
                entry.qty.map(f64::to_bits),
            );
            if !seen.insert(key) {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            println!("{}: {} duplicate entries", stream.name, duplicates);
            total += duplicates;
        }
    }

    if total == 0 {
        println!("No duplicates found in {}", file);
    } else {
        println!();
        println!("{} duplicate entries across the export", total);
    }

    Ok(())
}
