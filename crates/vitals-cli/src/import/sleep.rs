//! Sleep session merger
//!
//! Sleep entries are self-contained wide records, so no cross-stream merge is
//! needed: one entry supplies every field at once. Dedup is an existence
//! check on (dimension, start, end) before insert.

use crate::db::models::SleepSession;
use crate::db::Database;
use crate::error::{Result, VitalsError};
use crate::export::{self, MetricEntry};

/// Merge one sleep entry into the store.
///
/// Returns `true` if a session was inserted, `false` if an identical session
/// already existed. Unparseable start/end times are an error the caller
/// logs and skips; the rest of the stream continues.
pub fn merge_session(db: &Database, entry: &MetricEntry) -> Result<bool> {
    let start_raw = entry
        .sleep_start
        .as_deref()
        .ok_or_else(|| VitalsError::InvalidTimestamp("sleep entry has no sleepStart".to_string()))?;
    let end_raw = entry
        .sleep_end
        .as_deref()
        .ok_or_else(|| VitalsError::InvalidTimestamp("sleep entry has no sleepEnd".to_string()))?;

    let start_time = export::normalize_timestamp(start_raw)?;
    let end_time = export::normalize_timestamp(end_raw)?;

    // in-bed window is optional; a malformed value drops just that field
    let in_bed_start = entry
        .in_bed_start
        .as_deref()
        .and_then(|s| export::normalize_timestamp(s).ok());
    let in_bed_end = entry
        .in_bed_end
        .as_deref()
        .and_then(|s| export::normalize_timestamp(s).ok());

    let common_data_id = db.get_or_create_common_data(&start_time, entry.source_label())?;

    if db.sleep_session_exists(common_data_id, &start_time, &end_time)? {
        return Ok(false);
    }

    db.insert_sleep_session(&SleepSession {
        common_data_id,
        start_time,
        end_time,
        in_bed_hours: entry.in_bed,
        asleep_hours: entry.asleep,
        awake_hours: entry.awake,
        rem_hours: entry.rem,
        deep_hours: entry.deep,
        core_hours: entry.core,
        in_bed_start,
        in_bed_end,
    })?;

    Ok(true)
}
