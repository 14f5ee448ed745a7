//! Database models matching schema tables

use serde::{Deserialize, Serialize};

/// Routing category attached to each metric catalog entry.
///
/// Populated once from the static canonical-name table when the metric is
/// first seen; drives which fact table a stream's entries land in beyond the
/// raw-fact audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Sleep,
    Nutrition,
    HealthMarker,
    Uncategorized,
}

impl std::fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricCategory::Sleep => write!(f, "sleep"),
            MetricCategory::Nutrition => write!(f, "nutrition"),
            MetricCategory::HealthMarker => write!(f, "health_marker"),
            MetricCategory::Uncategorized => write!(f, "uncategorized"),
        }
    }
}

pub fn parse_category(s: &str) -> MetricCategory {
    match s {
        "sleep" => MetricCategory::Sleep,
        "nutrition" => MetricCategory::Nutrition,
        "health_marker" => MetricCategory::HealthMarker,
        _ => MetricCategory::Uncategorized,
    }
}

/// Metric catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub metric_id: i64,
    pub metric_name: String,
    pub units: Option<String>,
    pub category: MetricCategory,
}

/// One self-contained sleep session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub common_data_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub in_bed_hours: Option<f64>,
    pub asleep_hours: Option<f64>,
    pub awake_hours: Option<f64>,
    pub rem_hours: Option<f64>,
    pub deep_hours: Option<f64>,
    pub core_hours: Option<f64>,
    pub in_bed_start: Option<String>,
    pub in_bed_end: Option<String>,
}

/// Wide per-day nutrition record; columns fill in as streams contribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbohydrates_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub water: Option<f64>,
    pub caffeine: Option<f64>,
    pub fiber_g: Option<f64>,
    pub potassium: Option<f64>,
    pub sodium: Option<f64>,
    pub sugar_g: Option<f64>,
}

/// Wide per-day health-marker record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthMarkerFacts {
    pub time_in_daylight: Option<f64>,
    pub vo2_max: Option<f64>,
    pub heart_rate: Option<f64>,
    pub heart_rate_variability: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub blood_oxygen_saturation: Option<f64>,
    pub body_weight: Option<f64>,
    pub body_mass_index: Option<f64>,
}

/// Nutrition row joined back to its dimension, for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionDay {
    pub date: String,
    pub source: String,
    pub facts: NutritionFacts,
}

/// Health-marker row joined back to its dimension, for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMarkerDay {
    pub date: String,
    pub source: String,
    pub facts: HealthMarkerFacts,
}

/// Row counts per fact table, for `vitals status`
#[derive(Debug, Clone, Copy, Default)]
pub struct TableCounts {
    pub dimensions: i64,
    pub metrics: i64,
    pub raw_facts: i64,
    pub sleep_sessions: i64,
    pub nutrition_days: i64,
    pub health_marker_days: i64,
}
