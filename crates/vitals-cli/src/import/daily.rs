//! Daily aggregators for nutrition and health-marker streams
//!
//! The export is the inverse of the target schema: each nutrient or vital is
//! its own narrow stream, but the fact tables want one wide row per
//! (date, source). Aggregation runs in two phases over the whole import call:
//! phase 1 accumulates per-key partial records in memory while streams are
//! walked; phase 2 flushes them after every stream has contributed, inserting
//! new rows or merging into existing ones with field-wise COALESCE so a later
//! import never erases a previously stored field.

use std::collections::BTreeMap;

use crate::db::models::{HealthMarkerFacts, NutritionFacts};
use crate::db::Database;
use crate::error::Result;

/// A wide partial record that accepts single-field writes by canonical name
pub trait DailyFacts: Default {
    /// Write a value into the named field. Returns false when the name is
    /// not one of this record's fields.
    fn set_field(&mut self, field: &str, qty: f64) -> bool;

    /// True when every field is unset
    fn is_empty(&self) -> bool;
}

impl DailyFacts for NutritionFacts {
    fn set_field(&mut self, field: &str, qty: f64) -> bool {
        let slot = match field {
            "calories" => &mut self.calories,
            "protein_g" => &mut self.protein_g,
            "carbohydrates_g" => &mut self.carbohydrates_g,
            "fat_g" => &mut self.fat_g,
            "water" => &mut self.water,
            "caffeine" => &mut self.caffeine,
            "fiber_g" => &mut self.fiber_g,
            "potassium" => &mut self.potassium,
            "sodium" => &mut self.sodium,
            "sugar_g" => &mut self.sugar_g,
            _ => return false,
        };
        *slot = Some(qty);
        true
    }

    fn is_empty(&self) -> bool {
        *self == NutritionFacts::default()
    }
}

impl DailyFacts for HealthMarkerFacts {
    fn set_field(&mut self, field: &str, qty: f64) -> bool {
        let slot = match field {
            "time_in_daylight" => &mut self.time_in_daylight,
            "vo2_max" => &mut self.vo2_max,
            "heart_rate" => &mut self.heart_rate,
            "heart_rate_variability" => &mut self.heart_rate_variability,
            "resting_heart_rate" => &mut self.resting_heart_rate,
            "respiratory_rate" => &mut self.respiratory_rate,
            "blood_oxygen_saturation" => &mut self.blood_oxygen_saturation,
            "body_weight" => &mut self.body_weight,
            "body_mass_index" => &mut self.body_mass_index,
            _ => return false,
        };
        *slot = Some(qty);
        true
    }

    fn is_empty(&self) -> bool {
        *self == HealthMarkerFacts::default()
    }
}

/// Phase-1 accumulator: (date, source) -> partial wide record.
///
/// Constructed fresh for every import call and threaded through the stream
/// loop; each field is written by exactly one canonical stream, so write
/// order across streams never conflicts on a field. Last write within a
/// stream wins.
#[derive(Debug)]
pub struct DailyAccumulator<R> {
    records: BTreeMap<(String, String), R>,
}

impl<R: DailyFacts> DailyAccumulator<R> {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Record one value under the entry's own (date, source) key
    pub fn record(&mut self, date: &str, source: &str, field: &str, qty: f64) {
        let record = self
            .records
            .entry((date.to_string(), source.to_string()))
            .or_default();
        if !record.set_field(field, qty) {
            log::debug!("No daily field for metric {}, value dropped", field);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&(String, String), &R)> {
        self.records.iter()
    }
}

impl<R: DailyFacts> Default for DailyAccumulator<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters from one phase-2 flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
}

/// Phase-2 flush for the nutrition aggregator
pub fn flush_nutrition(
    db: &Database,
    acc: &DailyAccumulator<NutritionFacts>,
) -> Result<FlushOutcome> {
    let mut outcome = FlushOutcome::default();

    for ((date, source), facts) in acc.iter() {
        // grouping can produce empty shells; never write those
        if facts.is_empty() {
            continue;
        }

        let result = (|| -> Result<bool> {
            let common_data_id = db.get_or_create_common_data(date, source)?;
            if db.nutrition_exists(common_data_id)? {
                db.update_nutrition(common_data_id, facts)?;
                Ok(false)
            } else {
                db.insert_nutrition(common_data_id, facts)?;
                Ok(true)
            }
        })();

        match result {
            Ok(true) => outcome.inserted += 1,
            Ok(false) => outcome.updated += 1,
            Err(e) => {
                log::warn!("Skipping nutrition row for ({}, {}): {}", date, source, e);
                outcome.skipped += 1;
            }
        }
    }

    Ok(outcome)
}

/// Phase-2 flush for the health-marker aggregator
pub fn flush_health_markers(
    db: &Database,
    acc: &DailyAccumulator<HealthMarkerFacts>,
) -> Result<FlushOutcome> {
    let mut outcome = FlushOutcome::default();

    for ((date, source), facts) in acc.iter() {
        if facts.is_empty() {
            continue;
        }

        let result = (|| -> Result<bool> {
            let common_data_id = db.get_or_create_common_data(date, source)?;
            if db.health_marker_exists(common_data_id)? {
                db.update_health_markers(common_data_id, facts)?;
                Ok(false)
            } else {
                db.insert_health_markers(common_data_id, facts)?;
                Ok(true)
            }
        })();

        match result {
            Ok(true) => outcome.inserted += 1,
            Ok(false) => outcome.updated += 1,
            Err(e) => {
                log::warn!(
                    "Skipping health-marker row for ({}, {}): {}",
                    date,
                    source,
                    e
                );
                outcome.skipped += 1;
            }
        }
    }

    Ok(outcome)
}
