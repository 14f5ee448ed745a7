//! Metric name normalization and routing
//!
//! Raw export stream names are mapped to canonical field names through a
//! static alias table; unmapped names pass through unchanged. Each canonical
//! name carries a routing category that is stored on the metric catalog row
//! when the metric is first seen.

use crate::db::models::MetricCategory;

/// Raw export names that canonicalize to a different field name
const ALIASES: &[(&str, &str)] = &[
    ("dietary_energy", "calories"),
    ("protein", "protein_g"),
    ("carbohydrates", "carbohydrates_g"),
    ("total_fat", "fat_g"),
    ("dietary_water", "water"),
    ("dietary_caffeine", "caffeine"),
    ("fiber", "fiber_g"),
    ("dietary_sugar", "sugar_g"),
    ("weight_body_mass", "body_weight"),
];

/// Canonical names with their routing category.
///
/// Every name here maps onto a column of one of the wide fact tables; the
/// sleep stream routes whole entries instead of single fields.
const CATEGORIES: &[(&str, MetricCategory)] = &[
    ("sleep_analysis", MetricCategory::Sleep),
    // nutrition_data columns
    ("calories", MetricCategory::Nutrition),
    ("protein_g", MetricCategory::Nutrition),
    ("carbohydrates_g", MetricCategory::Nutrition),
    ("fat_g", MetricCategory::Nutrition),
    ("water", MetricCategory::Nutrition),
    ("caffeine", MetricCategory::Nutrition),
    ("fiber_g", MetricCategory::Nutrition),
    ("potassium", MetricCategory::Nutrition),
    ("sodium", MetricCategory::Nutrition),
    ("sugar_g", MetricCategory::Nutrition),
    // health_markers columns
    ("time_in_daylight", MetricCategory::HealthMarker),
    ("vo2_max", MetricCategory::HealthMarker),
    ("heart_rate", MetricCategory::HealthMarker),
    ("heart_rate_variability", MetricCategory::HealthMarker),
    ("resting_heart_rate", MetricCategory::HealthMarker),
    ("respiratory_rate", MetricCategory::HealthMarker),
    ("blood_oxygen_saturation", MetricCategory::HealthMarker),
    ("body_weight", MetricCategory::HealthMarker),
    ("body_mass_index", MetricCategory::HealthMarker),
];

/// Map a raw export stream name to its canonical field name
pub fn canonical_name(raw: &str) -> &str {
    ALIASES
        .iter()
        .find(|(from, _)| *from == raw)
        .map(|(_, to)| *to)
        .unwrap_or(raw)
}

/// Routing category for a canonical metric name
pub fn category_for(canonical: &str) -> MetricCategory {
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, cat)| *cat)
        .unwrap_or(MetricCategory::Uncategorized)
}
