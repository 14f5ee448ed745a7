//! Import engine for health export documents
//!
//! One engine call makes a single pass over every metric stream in the
//! document. Each stream is recorded in the raw-fact audit log and
//! additionally routed by its catalog category: sleep entries merge directly,
//! nutrition and health-marker values accumulate in per-call state that is
//! flushed after the pass. All writes share one transaction committed at the
//! end; a row-level failure is logged and skipped without aborting the call.

pub mod catalog;
pub mod daily;
pub mod raw;
pub mod sleep;

use chrono::NaiveDate;

use crate::db::models::{HealthMarkerFacts, MetricCategory, NutritionFacts};
use crate::db::Database;
use crate::error::{Result, VitalsError};
use crate::export::{self, HealthExport, MetricEntry, MetricStream};
use daily::{DailyAccumulator, DailyFacts};

/// Counters for one import call
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportStats {
    pub streams: u32,
    pub raw_facts: u32,
    pub sleep_sessions: u32,
    pub nutrition_inserted: u32,
    pub nutrition_updated: u32,
    pub markers_inserted: u32,
    pub markers_updated: u32,
    pub skipped: u32,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} streams, {} raw facts, {} sleep sessions, \
             {} nutrition days ({} merged), {} health-marker days ({} merged), \
             {} skipped entries",
            self.streams,
            self.raw_facts,
            self.sleep_sessions,
            self.nutrition_inserted + self.nutrition_updated,
            self.nutrition_updated,
            self.markers_inserted + self.markers_updated,
            self.markers_updated,
            self.skipped,
        )
    }
}

/// Per-call aggregation state.
///
/// Constructed fresh for every engine run and threaded into the handlers;
/// nothing here outlives the call.
struct ImportContext {
    nutrition: DailyAccumulator<NutritionFacts>,
    markers: DailyAccumulator<HealthMarkerFacts>,
    stats: ImportStats,
}

impl ImportContext {
    fn new() -> Self {
        Self {
            nutrition: DailyAccumulator::new(),
            markers: DailyAccumulator::new(),
            stats: ImportStats::default(),
        }
    }
}

/// Import engine over an open database
pub struct ImportEngine<'a> {
    db: &'a Database,
}

impl<'a> ImportEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Run one import pass over the document.
    ///
    /// With `day` set, streams are pre-filtered to entries on that calendar
    /// date. Safe to re-run over the same document: every insert is guarded
    /// by an existence check and daily rows merge without erasing fields.
    pub fn run(&self, mut export: HealthExport, day: Option<NaiveDate>) -> Result<ImportStats> {
        if let Some(day) = day {
            export.retain_day(day);
        }

        let tx = self.db.begin()?;
        let mut ctx = ImportContext::new();

        for stream in &export.data.metrics {
            self.import_stream(stream, &mut ctx)?;
        }

        // phase-2 flushes, after every stream has contributed
        let nutrition = daily::flush_nutrition(self.db, &ctx.nutrition)?;
        let markers = daily::flush_health_markers(self.db, &ctx.markers)?;
        ctx.stats.nutrition_inserted = nutrition.inserted;
        ctx.stats.nutrition_updated = nutrition.updated;
        ctx.stats.markers_inserted = markers.inserted;
        ctx.stats.markers_updated = markers.updated;
        ctx.stats.skipped += nutrition.skipped + markers.skipped;

        tx.commit()
            .map_err(|e| VitalsError::Database(format!("Failed to commit import: {}", e)))?;

        Ok(ctx.stats)
    }

    fn import_stream(&self, stream: &MetricStream, ctx: &mut ImportContext) -> Result<()> {
        let canonical = catalog::canonical_name(&stream.name);
        let category = catalog::category_for(canonical);
        let metric_id =
            self.db
                .get_or_create_metric(canonical, stream.units.as_deref(), category)?;

        ctx.stats.streams += 1;
        log::debug!(
            "Importing stream {} -> {} ({}, {} entries)",
            stream.name,
            canonical,
            category,
            stream.data.len()
        );

        for entry in &stream.data {
            // every entry feeds the audit log; routing below is additive
            match raw::record(self.db, metric_id, entry) {
                Ok(true) => ctx.stats.raw_facts += 1,
                Ok(false) => {}
                Err(e) => {
                    log::warn!("Skipping raw fact for {}: {}", canonical, e);
                    ctx.stats.skipped += 1;
                }
            }

            match category {
                MetricCategory::Sleep => self.merge_sleep(entry, ctx),
                MetricCategory::Nutrition => {
                    accumulate(entry, canonical, &mut ctx.nutrition);
                }
                MetricCategory::HealthMarker => {
                    accumulate(entry, canonical, &mut ctx.markers);
                }
                MetricCategory::Uncategorized => {}
            }
        }

        Ok(())
    }

    fn merge_sleep(&self, entry: &MetricEntry, ctx: &mut ImportContext) {
        match sleep::merge_session(self.db, entry) {
            Ok(true) => ctx.stats.sleep_sessions += 1,
            Ok(false) => {}
            Err(e) => {
                log::warn!("Skipping sleep entry: {}", e);
                ctx.stats.skipped += 1;
            }
        }
    }
}

/// Phase-1 write for one narrow entry.
///
/// Date problems were already counted by the raw-fact recorder for this same
/// entry, so here they only demote to a debug line.
fn accumulate<R: DailyFacts>(entry: &MetricEntry, field: &str, acc: &mut DailyAccumulator<R>) {
    let Some(raw_date) = entry.date.as_deref() else {
        log::debug!("Entry for {} has no date, not accumulated", field);
        return;
    };
    let date = match export::normalize_timestamp(raw_date) {
        Ok(date) => date,
        Err(e) => {
            log::debug!("Entry for {} not accumulated: {}", field, e);
            return;
        }
    };
    let Some(qty) = entry.qty else {
        log::debug!("Entry for {} has no quantity, not accumulated", field);
        return;
    };

    acc.record(&date, entry.source_label(), field, qty);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(db: &Database, json: &str) -> ImportStats {
        let export = HealthExport::from_json(json).unwrap();
        ImportEngine::new(db).run(export, None).unwrap()
    }

    #[test]
    fn test_protein_and_energy_make_one_nutrition_row() {
        let db = Database::open_in_memory().unwrap();

        let stats = import(
            &db,
            r#"{"data": {"metrics": [
                {"name": "protein", "units": "g", "data": [
                    {"date": "2024-01-15 00:00:00 -0500", "qty": 150.0, "source": "App"}
                ]},
                {"name": "dietary_energy", "units": "kcal", "data": [
                    {"date": "2024-01-15 00:00:00 -0500", "qty": 2200.0, "source": "App"}
                ]}
            ]}}"#,
        );

        assert_eq!(stats.raw_facts, 2);
        assert_eq!(stats.nutrition_inserted, 1);
        assert_eq!(stats.nutrition_updated, 0);

        let dim = db
            .find_common_data("2024-01-15 00:00:00 -0500", "App")
            .unwrap()
            .unwrap();
        let facts = db.get_nutrition(dim).unwrap().unwrap();
        assert_eq!(facts.protein_g, Some(150.0));
        assert_eq!(facts.calories, Some(2200.0));
        assert_eq!(facts.carbohydrates_g, None);
        assert_eq!(facts.fat_g, None);
    }

    #[test]
    fn test_unmapped_stream_is_raw_fact_only() {
        let db = Database::open_in_memory().unwrap();

        let stats = import(
            &db,
            r#"{"data": {"metrics": [
                {"name": "step_count", "units": "count", "data": [
                    {"date": "2024-01-15 00:00:00 -0500", "qty": 9000.0, "source": "Phone"}
                ]}
            ]}}"#,
        );

        assert_eq!(stats.raw_facts, 1);
        assert_eq!(stats.nutrition_inserted + stats.markers_inserted, 0);

        let metric = db.find_metric("step_count").unwrap().unwrap();
        assert_eq!(metric.category, MetricCategory::Uncategorized);
    }

    #[test]
    fn test_bad_sleep_entry_does_not_abort_stream() {
        let db = Database::open_in_memory().unwrap();

        let stats = import(
            &db,
            r#"{"data": {"metrics": [
                {"name": "sleep_analysis", "units": "hr", "data": [
                    {"date": "2024-01-14 07:00:00 -0500", "source": "Watch",
                     "sleepStart": "broken", "sleepEnd": "2024-01-14 07:00:00 -0500",
                     "asleep": 6.9},
                    {"date": "2024-01-15 07:10:00 -0500", "source": "Watch",
                     "sleepStart": "2024-01-14 23:05:00 -0500",
                     "sleepEnd": "2024-01-15 07:10:00 -0500",
                     "asleep": 7.4}
                ]}
            ]}}"#,
        );

        assert_eq!(stats.sleep_sessions, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(db.counts().unwrap().sleep_sessions, 1);
    }

    #[test]
    fn test_day_filter_restricts_import() {
        let db = Database::open_in_memory().unwrap();

        let export = HealthExport::from_json(
            r#"{"data": {"metrics": [
                {"name": "protein", "units": "g", "data": [
                    {"date": "2024-01-15 00:00:00 -0500", "qty": 150.0, "source": "App"},
                    {"date": "2024-01-16 00:00:00 -0500", "qty": 140.0, "source": "App"}
                ]}
            ]}}"#,
        )
        .unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let stats = ImportEngine::new(&db).run(export, Some(day)).unwrap();

        assert_eq!(stats.raw_facts, 1);
        assert_eq!(db.counts().unwrap().nutrition_days, 1);
        assert!(db
            .find_common_data("2024-01-16 00:00:00 -0500", "App")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_stats_display() {
        let stats = ImportStats {
            streams: 3,
            raw_facts: 10,
            ..Default::default()
        };
        let line = stats.to_string();
        assert!(line.contains("3 streams"));
        assert!(line.contains("10 raw facts"));
    }
}
