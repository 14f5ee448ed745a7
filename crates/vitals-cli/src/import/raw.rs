//! Raw fact recorder
//!
//! Every stream entry is recorded here regardless of routing, one row per
//! (dimension, metric). The full original entry is serialized alongside the
//! quantity so later schema changes can re-derive fields from the audit log.

use crate::db::Database;
use crate::error::{Result, VitalsError};
use crate::export::{self, MetricEntry};

/// Record one entry as a raw fact.
///
/// Returns `true` if a row was inserted, `false` if one already existed for
/// this (dimension, metric) — which is what makes re-imports no-ops.
pub fn record(db: &Database, metric_id: i64, entry: &MetricEntry) -> Result<bool> {
    let raw_date = entry
        .date
        .as_deref()
        .ok_or_else(|| VitalsError::InvalidTimestamp("entry has no date".to_string()))?;
    let date = export::normalize_timestamp(raw_date)?;

    let common_data_id = db.get_or_create_common_data(&date, entry.source_label())?;

    if db.raw_fact_exists(common_data_id, metric_id)? {
        return Ok(false);
    }

    let payload = serde_json::to_string(entry)?;
    db.insert_raw_fact(common_data_id, metric_id, entry.qty, &payload)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MetricCategory;

    fn entry(date: &str, qty: f64, source: &str) -> MetricEntry {
        MetricEntry {
            date: Some(date.to_string()),
            qty: Some(qty),
            source: Some(source.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_inserts_once() {
        let db = Database::open_in_memory().unwrap();
        let metric_id = db
            .get_or_create_metric("heart_rate", Some("bpm"), MetricCategory::HealthMarker)
            .unwrap();

        let e = entry("2024-01-15 08:30:00 -0500", 62.0, "Watch");
        assert!(record(&db, metric_id, &e).unwrap());
        assert!(!record(&db, metric_id, &e).unwrap());

        assert_eq!(db.counts().unwrap().raw_facts, 1);
    }

    #[test]
    fn test_record_rejects_missing_date() {
        let db = Database::open_in_memory().unwrap();
        let metric_id = db
            .get_or_create_metric("heart_rate", Some("bpm"), MetricCategory::HealthMarker)
            .unwrap();

        let e = MetricEntry {
            qty: Some(62.0),
            ..Default::default()
        };
        assert!(matches!(
            record(&db, metric_id, &e),
            Err(VitalsError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_metrics_share_one_dimension() {
        let db = Database::open_in_memory().unwrap();
        let metric_id = db
            .get_or_create_metric("heart_rate", Some("bpm"), MetricCategory::HealthMarker)
            .unwrap();

        let mut e = entry("2024-01-15 08:30:00 -0500", 62.0, "Watch");
        e.extra
            .insert("Max".to_string(), serde_json::json!(171.0));
        record(&db, metric_id, &e).unwrap();

        // same (date, source) but a different metric gets its own fact
        let metric2 = db
            .get_or_create_metric("step_count", None, MetricCategory::Uncategorized)
            .unwrap();
        assert!(record(&db, metric2, &e).unwrap());
        assert_eq!(db.counts().unwrap().raw_facts, 2);
        assert_eq!(db.counts().unwrap().dimensions, 1);
    }
}
