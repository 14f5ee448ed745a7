//! Export document model
//!
//! Health Auto Export documents are shaped as
//! `{ "data": { "metrics": [ { name, units, data: [entries] } ] } }`.
//! Narrow streams carry `{date, qty, source}` points; the sleep stream carries
//! wide self-contained session entries. Unknown keys are preserved through
//! `extra` so the raw-fact audit payload round-trips the full original entry.

use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, VitalsError};

/// Timestamp pattern used throughout the export: `2024-01-15 08:30:00 -0500`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Source label used when an entry omits its source
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Top-level export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthExport {
    pub data: ExportData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(default)]
    pub metrics: Vec<MetricStream>,
}

/// One metric stream: a named time series of entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricStream {
    pub name: String,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub data: Vec<MetricEntry>,
}

/// One entry in a metric stream.
///
/// Only `date`/`qty`/`source` are present on narrow streams; the sleep stream
/// adds the session fields. Everything else lands in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(
        default,
        rename = "sleepStart",
        skip_serializing_if = "Option::is_none"
    )]
    pub sleep_start: Option<String>,

    #[serde(default, rename = "sleepEnd", skip_serializing_if = "Option::is_none")]
    pub sleep_end: Option<String>,

    #[serde(
        default,
        rename = "inBedStart",
        skip_serializing_if = "Option::is_none"
    )]
    pub in_bed_start: Option<String>,

    #[serde(default, rename = "inBedEnd", skip_serializing_if = "Option::is_none")]
    pub in_bed_end: Option<String>,

    #[serde(default, rename = "inBed", skip_serializing_if = "Option::is_none")]
    pub in_bed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asleep: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awake: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rem: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetricEntry {
    /// Source label, defaulting when absent
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }
}

impl HealthExport {
    /// Load an export document from a JSON file.
    ///
    /// A missing file aborts the whole run; nothing is partially imported.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VitalsError::ExportNotFound(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse an export document from a JSON string
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| VitalsError::invalid_export(format!("Malformed export JSON: {}", e)))
    }

    /// Restrict every stream to entries whose parsed date falls on `day`.
    ///
    /// Entries with unparseable dates cannot match and are dropped.
    pub fn retain_day(&mut self, day: NaiveDate) {
        for stream in &mut self.data.metrics {
            stream.data.retain(|entry| {
                entry
                    .date
                    .as_deref()
                    .and_then(|d| parse_timestamp(d).ok())
                    .map(|ts| ts.date_naive() == day)
                    .unwrap_or(false)
            });
        }
    }
}

/// Parse an export timestamp string
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| VitalsError::InvalidTimestamp(raw.to_string()))
}

/// Normalize a timestamp to its canonical string form.
///
/// Parses and re-renders in the export pattern. Exact-match semantics only:
/// the same instant written with a different offset stays a distinct key.
pub fn normalize_timestamp(raw: &str) -> Result<String> {
    Ok(parse_timestamp(raw)?.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-01-15 08:30:00 -0500").unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday-ish").is_err());
        assert!(parse_timestamp("2024-01-15").is_err());
    }

    #[test]
    fn test_normalize_is_stable() {
        let raw = "2024-01-15 08:30:00 -0500";
        let normalized = normalize_timestamp(raw).unwrap();
        assert_eq!(normalized, raw);
        assert_eq!(normalize_timestamp(&normalized).unwrap(), normalized);
    }

    #[test]
    fn test_same_instant_different_offset_stays_distinct() {
        let east = normalize_timestamp("2024-01-15 13:30:00 +0000").unwrap();
        let west = normalize_timestamp("2024-01-15 08:30:00 -0500").unwrap();
        assert_ne!(east, west);
    }

    #[test]
    fn test_entry_preserves_unknown_keys() {
        let raw = r#"{"date": "2024-01-15 08:30:00 -0500", "qty": 62.0,
                      "source": "Watch", "Avg": 61.5, "Min": 48.0}"#;
        let entry: MetricEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.qty, Some(62.0));
        assert_eq!(entry.extra.get("Avg"), Some(&serde_json::json!(61.5)));

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["Min"], serde_json::json!(48.0));
        // unset fields are omitted, not serialized as null
        assert!(back.get("sleepStart").is_none());
    }

    #[test]
    fn test_retain_day_filters_streams() {
        let raw = r#"{"data": {"metrics": [{
            "name": "protein",
            "units": "g",
            "data": [
                {"date": "2024-01-15 00:00:00 -0500", "qty": 150.0, "source": "App"},
                {"date": "2024-01-16 00:00:00 -0500", "qty": 140.0, "source": "App"},
                {"date": "not a date", "qty": 1.0, "source": "App"}
            ]
        }]}}"#;

        let mut export = HealthExport::from_json(raw).unwrap();
        export.retain_day(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        assert_eq!(export.data.metrics[0].data.len(), 1);
        assert_eq!(export.data.metrics[0].data[0].qty, Some(150.0));
    }

    #[test]
    fn test_source_label_default() {
        let entry = MetricEntry::default();
        assert_eq!(entry.source_label(), "Unknown");
    }
}
