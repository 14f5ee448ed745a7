//! SQLite storage for normalized health data
//!
//! One database holds:
//! - common_data: the (date, source) dimension every fact table hangs off of
//! - metrics: the metric catalog with routing categories
//! - data: the raw-fact audit log, one row per (dimension, metric)
//! - sleep_data, nutrition_data, health_markers: the fact tables

pub mod models;

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::error::{Result, VitalsError};
use models::{
    parse_category, HealthMarkerDay, HealthMarkerFacts, Metric, MetricCategory, NutritionDay,
    NutritionFacts, SleepSession, TableCounts,
};

/// SQLite database for imported health data
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| VitalsError::Database(format!("Failed to open database: {}", e)))?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            VitalsError::Database(format!("Failed to open in-memory database: {}", e))
        })?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Run migrations
    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS common_data (
                    common_data_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL,
                    source TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    UNIQUE (date, source)
                );

                CREATE TABLE IF NOT EXISTS metrics (
                    metric_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    metric_name TEXT NOT NULL UNIQUE,
                    units TEXT,
                    category TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS data (
                    data_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    common_data_id INTEGER NOT NULL REFERENCES common_data(common_data_id),
                    metric_id INTEGER NOT NULL REFERENCES metrics(metric_id),
                    qty REAL,
                    data_json TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    UNIQUE (common_data_id, metric_id)
                );

                CREATE TABLE IF NOT EXISTS sleep_data (
                    sleep_data_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    common_data_id INTEGER NOT NULL REFERENCES common_data(common_data_id),
                    start_time TEXT NOT NULL,
                    end_time TEXT NOT NULL,
                    in_bed_hours REAL,
                    asleep_hours REAL,
                    awake_hours REAL,
                    rem_hours REAL,
                    deep_hours REAL,
                    core_hours REAL,
                    in_bed_start TEXT,
                    in_bed_end TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    UNIQUE (common_data_id, start_time, end_time)
                );

                CREATE TABLE IF NOT EXISTS nutrition_data (
                    nutrition_data_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    common_data_id INTEGER NOT NULL UNIQUE
                        REFERENCES common_data(common_data_id),
                    calories REAL,
                    protein_g REAL,
                    carbohydrates_g REAL,
                    fat_g REAL,
                    water REAL,
                    caffeine REAL,
                    fiber_g REAL,
                    potassium REAL,
                    sodium REAL,
                    sugar_g REAL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE TABLE IF NOT EXISTS health_markers (
                    health_marker_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    common_data_id INTEGER NOT NULL UNIQUE
                        REFERENCES common_data(common_data_id),
                    time_in_daylight REAL,
                    vo2_max REAL,
                    heart_rate REAL,
                    heart_rate_variability REAL,
                    resting_heart_rate REAL,
                    respiratory_rate REAL,
                    blood_oxygen_saturation REAL,
                    body_weight REAL,
                    body_mass_index REAL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );
                "#,
            )
            .map_err(|e| VitalsError::Database(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }

    /// Begin a transaction spanning one import call.
    ///
    /// Dropping the handle without committing rolls everything back.
    pub fn begin(&self) -> Result<Transaction<'_>> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| VitalsError::Database(format!("Failed to begin transaction: {}", e)))
    }

    // =========================================================================
    // Dimension Resolver
    // =========================================================================

    /// Get or create the dimension id for a (date, source) pair.
    ///
    /// Exact string match only; timestamps that serialize differently are
    /// distinct dimension keys. This is the single seam shared by every fact
    /// table and by the sibling workout/diet importers.
    pub fn get_or_create_common_data(&self, date: &str, source: &str) -> Result<i64> {
        if let Some(id) = self.find_common_data(date, source)? {
            return Ok(id);
        }

        self.conn
            .execute(
                "INSERT INTO common_data (date, source) VALUES (?, ?)",
                params![date, source],
            )
            .map_err(|e| VitalsError::Database(format!("Failed to create dimension row: {}", e)))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Look up a dimension id by exact (date, source) match
    pub fn find_common_data(&self, date: &str, source: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT common_data_id FROM common_data WHERE date = ? AND source = ?",
                params![date, source],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| VitalsError::Database(format!("Failed to look up dimension row: {}", e)))
    }

    // =========================================================================
    // Metric Catalog
    // =========================================================================

    /// Get or create a metric catalog entry.
    ///
    /// Units and category from the first sighting win; later observations do
    /// not modify the entry.
    pub fn get_or_create_metric(
        &self,
        name: &str,
        units: Option<&str>,
        category: MetricCategory,
    ) -> Result<i64> {
        if let Some(metric) = self.find_metric(name)? {
            return Ok(metric.metric_id);
        }

        self.conn
            .execute(
                "INSERT INTO metrics (metric_name, units, category) VALUES (?, ?, ?)",
                params![name, units, category.to_string()],
            )
            .map_err(|e| VitalsError::Database(format!("Failed to create metric: {}", e)))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Look up a metric catalog entry by canonical name
    pub fn find_metric(&self, name: &str) -> Result<Option<Metric>> {
        self.conn
            .query_row(
                "SELECT metric_id, metric_name, units, category
                 FROM metrics
                 WHERE metric_name = ?",
                params![name],
                |row| {
                    Ok(Metric {
                        metric_id: row.get(0)?,
                        metric_name: row.get(1)?,
                        units: row.get(2)?,
                        category: parse_category(&row.get::<_, String>(3)?),
                    })
                },
            )
            .optional()
            .map_err(|e| VitalsError::Database(format!("Failed to look up metric: {}", e)))
    }

    // =========================================================================
    // Raw Facts
    // =========================================================================

    /// Check whether a raw fact already exists for (dimension, metric)
    pub fn raw_fact_exists(&self, common_data_id: i64, metric_id: i64) -> Result<bool> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT data_id FROM data WHERE common_data_id = ? AND metric_id = ?",
                params![common_data_id, metric_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| VitalsError::Database(format!("Failed to check raw fact: {}", e)))?;

        Ok(id.is_some())
    }

    /// Insert a raw fact, retaining the original entry for audit
    pub fn insert_raw_fact(
        &self,
        common_data_id: i64,
        metric_id: i64,
        qty: Option<f64>,
        data_json: &str,
    ) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO data (common_data_id, metric_id, qty, data_json)
                 VALUES (?, ?, ?, ?)",
                params![common_data_id, metric_id, qty, data_json],
            )
            .map_err(|e| VitalsError::Database(format!("Failed to insert raw fact: {}", e)))?;

        Ok(())
    }

    // =========================================================================
    // Sleep Sessions
    // =========================================================================

    /// Check whether a sleep session exists at (dimension, start, end)
    pub fn sleep_session_exists(
        &self,
        common_data_id: i64,
        start_time: &str,
        end_time: &str,
    ) -> Result<bool> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT sleep_data_id FROM sleep_data
                 WHERE common_data_id = ? AND start_time = ? AND end_time = ?",
                params![common_data_id, start_time, end_time],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| VitalsError::Database(format!("Failed to check sleep session: {}", e)))?;

        Ok(id.is_some())
    }

    /// Insert a full sleep session row
    pub fn insert_sleep_session(&self, session: &SleepSession) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO sleep_data (
                     common_data_id, start_time, end_time,
                     in_bed_hours, asleep_hours, awake_hours,
                     rem_hours, deep_hours, core_hours,
                     in_bed_start, in_bed_end
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    session.common_data_id,
                    session.start_time,
                    session.end_time,
                    session.in_bed_hours,
                    session.asleep_hours,
                    session.awake_hours,
                    session.rem_hours,
                    session.deep_hours,
                    session.core_hours,
                    session.in_bed_start,
                    session.in_bed_end,
                ],
            )
            .map_err(|e| VitalsError::Database(format!("Failed to insert sleep session: {}", e)))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// List sleep sessions whose start time falls in the date range
    pub fn sleep_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<SleepSession>> {
        let from = from.map(|d| d.format("%Y-%m-%d").to_string());
        let to = to.map(|d| d.format("%Y-%m-%d").to_string());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT common_data_id, start_time, end_time,
                        in_bed_hours, asleep_hours, awake_hours,
                        rem_hours, deep_hours, core_hours,
                        in_bed_start, in_bed_end
                 FROM sleep_data
                 WHERE (?1 IS NULL OR substr(start_time, 1, 10) >= ?1)
                   AND (?2 IS NULL OR substr(start_time, 1, 10) <= ?2)
                 ORDER BY start_time",
            )
            .map_err(|e| VitalsError::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![from, to], |row| {
                Ok(SleepSession {
                    common_data_id: row.get(0)?,
                    start_time: row.get(1)?,
                    end_time: row.get(2)?,
                    in_bed_hours: row.get(3)?,
                    asleep_hours: row.get(4)?,
                    awake_hours: row.get(5)?,
                    rem_hours: row.get(6)?,
                    deep_hours: row.get(7)?,
                    core_hours: row.get(8)?,
                    in_bed_start: row.get(9)?,
                    in_bed_end: row.get(10)?,
                })
            })
            .map_err(|e| VitalsError::Database(format!("Failed to query sleep data: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| VitalsError::Database(e.to_string()))
    }

    // =========================================================================
    // Nutrition Daily Records
    // =========================================================================

    /// Check whether a nutrition daily record exists for a dimension
    pub fn nutrition_exists(&self, common_data_id: i64) -> Result<bool> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT nutrition_data_id FROM nutrition_data WHERE common_data_id = ?",
                params![common_data_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| VitalsError::Database(format!("Failed to check nutrition row: {}", e)))?;

        Ok(id.is_some())
    }

    /// Insert a full nutrition daily record (unset fields stored as null)
    pub fn insert_nutrition(&self, common_data_id: i64, facts: &NutritionFacts) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO nutrition_data (
                     common_data_id, calories, protein_g, carbohydrates_g, fat_g,
                     water, caffeine, fiber_g, potassium, sodium, sugar_g
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    common_data_id,
                    facts.calories,
                    facts.protein_g,
                    facts.carbohydrates_g,
                    facts.fat_g,
                    facts.water,
                    facts.caffeine,
                    facts.fiber_g,
                    facts.potassium,
                    facts.sodium,
                    facts.sugar_g,
                ],
            )
            .map_err(|e| VitalsError::Database(format!("Failed to insert nutrition row: {}", e)))?;

        Ok(())
    }

    /// Merge new values into an existing nutrition record.
    ///
    /// Field-wise COALESCE: a column is overwritten only when the new value
    /// is non-null, so earlier imports are never erased.
    pub fn update_nutrition(&self, common_data_id: i64, facts: &NutritionFacts) -> Result<()> {
        self.conn
            .execute(
                "UPDATE nutrition_data SET
                     calories        = COALESCE(?2, calories),
                     protein_g       = COALESCE(?3, protein_g),
                     carbohydrates_g = COALESCE(?4, carbohydrates_g),
                     fat_g           = COALESCE(?5, fat_g),
                     water           = COALESCE(?6, water),
                     caffeine        = COALESCE(?7, caffeine),
                     fiber_g         = COALESCE(?8, fiber_g),
                     potassium       = COALESCE(?9, potassium),
                     sodium          = COALESCE(?10, sodium),
                     sugar_g         = COALESCE(?11, sugar_g),
                     updated_at      = datetime('now')
                 WHERE common_data_id = ?1",
                params![
                    common_data_id,
                    facts.calories,
                    facts.protein_g,
                    facts.carbohydrates_g,
                    facts.fat_g,
                    facts.water,
                    facts.caffeine,
                    facts.fiber_g,
                    facts.potassium,
                    facts.sodium,
                    facts.sugar_g,
                ],
            )
            .map_err(|e| VitalsError::Database(format!("Failed to update nutrition row: {}", e)))?;

        Ok(())
    }

    /// Fetch the nutrition record for a dimension, if any
    pub fn get_nutrition(&self, common_data_id: i64) -> Result<Option<NutritionFacts>> {
        self.conn
            .query_row(
                "SELECT calories, protein_g, carbohydrates_g, fat_g, water,
                        caffeine, fiber_g, potassium, sodium, sugar_g
                 FROM nutrition_data
                 WHERE common_data_id = ?",
                params![common_data_id],
                |row| {
                    Ok(NutritionFacts {
                        calories: row.get(0)?,
                        protein_g: row.get(1)?,
                        carbohydrates_g: row.get(2)?,
                        fat_g: row.get(3)?,
                        water: row.get(4)?,
                        caffeine: row.get(5)?,
                        fiber_g: row.get(6)?,
                        potassium: row.get(7)?,
                        sodium: row.get(8)?,
                        sugar_g: row.get(9)?,
                    })
                },
            )
            .optional()
            .map_err(|e| VitalsError::Database(format!("Failed to get nutrition row: {}", e)))
    }

    /// List nutrition records joined to their dimension, ordered by date
    pub fn nutrition_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<NutritionDay>> {
        let from = from.map(|d| d.format("%Y-%m-%d").to_string());
        let to = to.map(|d| d.format("%Y-%m-%d").to_string());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.date, c.source,
                        n.calories, n.protein_g, n.carbohydrates_g, n.fat_g, n.water,
                        n.caffeine, n.fiber_g, n.potassium, n.sodium, n.sugar_g
                 FROM nutrition_data n
                 JOIN common_data c ON n.common_data_id = c.common_data_id
                 WHERE (?1 IS NULL OR substr(c.date, 1, 10) >= ?1)
                   AND (?2 IS NULL OR substr(c.date, 1, 10) <= ?2)
                 ORDER BY c.date",
            )
            .map_err(|e| VitalsError::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![from, to], |row| {
                Ok(NutritionDay {
                    date: row.get(0)?,
                    source: row.get(1)?,
                    facts: NutritionFacts {
                        calories: row.get(2)?,
                        protein_g: row.get(3)?,
                        carbohydrates_g: row.get(4)?,
                        fat_g: row.get(5)?,
                        water: row.get(6)?,
                        caffeine: row.get(7)?,
                        fiber_g: row.get(8)?,
                        potassium: row.get(9)?,
                        sodium: row.get(10)?,
                        sugar_g: row.get(11)?,
                    },
                })
            })
            .map_err(|e| VitalsError::Database(format!("Failed to query nutrition data: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| VitalsError::Database(e.to_string()))
    }

    // =========================================================================
    // Health Marker Daily Records
    // =========================================================================

    /// Check whether a health-marker daily record exists for a dimension
    pub fn health_marker_exists(&self, common_data_id: i64) -> Result<bool> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT health_marker_id FROM health_markers WHERE common_data_id = ?",
                params![common_data_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| {
                VitalsError::Database(format!("Failed to check health-marker row: {}", e))
            })?;

        Ok(id.is_some())
    }

    /// Insert a full health-marker daily record (unset fields stored as null)
    pub fn insert_health_markers(
        &self,
        common_data_id: i64,
        facts: &HealthMarkerFacts,
    ) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO health_markers (
                     common_data_id, time_in_daylight, vo2_max, heart_rate,
                     heart_rate_variability, resting_heart_rate, respiratory_rate,
                     blood_oxygen_saturation, body_weight, body_mass_index
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    common_data_id,
                    facts.time_in_daylight,
                    facts.vo2_max,
                    facts.heart_rate,
                    facts.heart_rate_variability,
                    facts.resting_heart_rate,
                    facts.respiratory_rate,
                    facts.blood_oxygen_saturation,
                    facts.body_weight,
                    facts.body_mass_index,
                ],
            )
            .map_err(|e| {
                VitalsError::Database(format!("Failed to insert health-marker row: {}", e))
            })?;

        Ok(())
    }

    /// Merge new values into an existing health-marker record (field-wise COALESCE)
    pub fn update_health_markers(
        &self,
        common_data_id: i64,
        facts: &HealthMarkerFacts,
    ) -> Result<()> {
        self.conn
            .execute(
                "UPDATE health_markers SET
                     time_in_daylight        = COALESCE(?2, time_in_daylight),
                     vo2_max                 = COALESCE(?3, vo2_max),
                     heart_rate              = COALESCE(?4, heart_rate),
                     heart_rate_variability  = COALESCE(?5, heart_rate_variability),
                     resting_heart_rate      = COALESCE(?6, resting_heart_rate),
                     respiratory_rate        = COALESCE(?7, respiratory_rate),
                     blood_oxygen_saturation = COALESCE(?8, blood_oxygen_saturation),
                     body_weight             = COALESCE(?9, body_weight),
                     body_mass_index         = COALESCE(?10, body_mass_index),
                     updated_at              = datetime('now')
                 WHERE common_data_id = ?1",
                params![
                    common_data_id,
                    facts.time_in_daylight,
                    facts.vo2_max,
                    facts.heart_rate,
                    facts.heart_rate_variability,
                    facts.resting_heart_rate,
                    facts.respiratory_rate,
                    facts.blood_oxygen_saturation,
                    facts.body_weight,
                    facts.body_mass_index,
                ],
            )
            .map_err(|e| {
                VitalsError::Database(format!("Failed to update health-marker row: {}", e))
            })?;

        Ok(())
    }

    /// Fetch the health-marker record for a dimension, if any
    pub fn get_health_markers(&self, common_data_id: i64) -> Result<Option<HealthMarkerFacts>> {
        self.conn
            .query_row(
                "SELECT time_in_daylight, vo2_max, heart_rate, heart_rate_variability,
                        resting_heart_rate, respiratory_rate, blood_oxygen_saturation,
                        body_weight, body_mass_index
                 FROM health_markers
                 WHERE common_data_id = ?",
                params![common_data_id],
                |row| {
                    Ok(HealthMarkerFacts {
                        time_in_daylight: row.get(0)?,
                        vo2_max: row.get(1)?,
                        heart_rate: row.get(2)?,
                        heart_rate_variability: row.get(3)?,
                        resting_heart_rate: row.get(4)?,
                        respiratory_rate: row.get(5)?,
                        blood_oxygen_saturation: row.get(6)?,
                        body_weight: row.get(7)?,
                        body_mass_index: row.get(8)?,
                    })
                },
            )
            .optional()
            .map_err(|e| VitalsError::Database(format!("Failed to get health-marker row: {}", e)))
    }

    /// List health-marker records joined to their dimension, ordered by date
    pub fn health_marker_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<HealthMarkerDay>> {
        let from = from.map(|d| d.format("%Y-%m-%d").to_string());
        let to = to.map(|d| d.format("%Y-%m-%d").to_string());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.date, c.source,
                        h.time_in_daylight, h.vo2_max, h.heart_rate,
                        h.heart_rate_variability, h.resting_heart_rate,
                        h.respiratory_rate, h.blood_oxygen_saturation,
                        h.body_weight, h.body_mass_index
                 FROM health_markers h
                 JOIN common_data c ON h.common_data_id = c.common_data_id
                 WHERE (?1 IS NULL OR substr(c.date, 1, 10) >= ?1)
                   AND (?2 IS NULL OR substr(c.date, 1, 10) <= ?2)
                 ORDER BY c.date",
            )
            .map_err(|e| VitalsError::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![from, to], |row| {
                Ok(HealthMarkerDay {
                    date: row.get(0)?,
                    source: row.get(1)?,
                    facts: HealthMarkerFacts {
                        time_in_daylight: row.get(2)?,
                        vo2_max: row.get(3)?,
                        heart_rate: row.get(4)?,
                        heart_rate_variability: row.get(5)?,
                        resting_heart_rate: row.get(6)?,
                        respiratory_rate: row.get(7)?,
                        blood_oxygen_saturation: row.get(8)?,
                        body_weight: row.get(9)?,
                        body_mass_index: row.get(10)?,
                    },
                })
            })
            .map_err(|e| {
                VitalsError::Database(format!("Failed to query health-marker data: {}", e))
            })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| VitalsError::Database(e.to_string()))
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Row counts per table, for `vitals status`
    pub fn counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<i64> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
                .map_err(|e| VitalsError::Database(format!("Failed to count {}: {}", table, e)))
        };

        Ok(TableCounts {
            dimensions: count("common_data")?,
            metrics: count("metrics")?,
            raw_facts: count("data")?,
            sleep_sessions: count("sleep_data")?,
            nutrition_days: count("nutrition_data")?,
            health_marker_days: count("health_markers")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_get_or_create() {
        let db = Database::open_in_memory().unwrap();

        let id1 = db
            .get_or_create_common_data("2024-01-15 08:30:00 -0500", "iPhone")
            .unwrap();
        let id2 = db
            .get_or_create_common_data("2024-01-15 08:30:00 -0500", "iPhone")
            .unwrap();
        assert_eq!(id1, id2);

        let id3 = db
            .get_or_create_common_data("2024-01-15 08:30:00 -0500", "Watch")
            .unwrap();
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_metric_units_first_observation_wins() {
        let db = Database::open_in_memory().unwrap();

        let id1 = db
            .get_or_create_metric("protein_g", Some("g"), MetricCategory::Nutrition)
            .unwrap();
        let id2 = db
            .get_or_create_metric("protein_g", Some("oz"), MetricCategory::Nutrition)
            .unwrap();
        assert_eq!(id1, id2);

        let metric = db.find_metric("protein_g").unwrap().unwrap();
        assert_eq!(metric.units.as_deref(), Some("g"));
        assert_eq!(metric.category, MetricCategory::Nutrition);
    }

    #[test]
    fn test_raw_fact_exists_after_insert() {
        let db = Database::open_in_memory().unwrap();

        let dim = db
            .get_or_create_common_data("2024-01-15 08:30:00 -0500", "iPhone")
            .unwrap();
        let metric = db
            .get_or_create_metric("heart_rate", Some("bpm"), MetricCategory::HealthMarker)
            .unwrap();

        assert!(!db.raw_fact_exists(dim, metric).unwrap());
        db.insert_raw_fact(dim, metric, Some(62.0), "{\"qty\":62.0}")
            .unwrap();
        assert!(db.raw_fact_exists(dim, metric).unwrap());
    }

    #[test]
    fn test_duplicate_raw_fact_violates_constraint() {
        let db = Database::open_in_memory().unwrap();

        let dim = db
            .get_or_create_common_data("2024-01-15 08:30:00 -0500", "iPhone")
            .unwrap();
        let metric = db
            .get_or_create_metric("heart_rate", Some("bpm"), MetricCategory::HealthMarker)
            .unwrap();

        db.insert_raw_fact(dim, metric, Some(62.0), "{}").unwrap();
        let err = db.insert_raw_fact(dim, metric, Some(62.0), "{}");
        assert!(err.is_err());
    }

    #[test]
    fn test_sleep_session_dedup_key() {
        let db = Database::open_in_memory().unwrap();

        let dim = db
            .get_or_create_common_data("2024-01-14 23:05:00 -0500", "Watch")
            .unwrap();
        let session = SleepSession {
            common_data_id: dim,
            start_time: "2024-01-14 23:05:00 -0500".to_string(),
            end_time: "2024-01-15 07:10:00 -0500".to_string(),
            asleep_hours: Some(7.4),
            ..Default::default()
        };

        assert!(!db
            .sleep_session_exists(dim, &session.start_time, &session.end_time)
            .unwrap());
        db.insert_sleep_session(&session).unwrap();
        assert!(db
            .sleep_session_exists(dim, &session.start_time, &session.end_time)
            .unwrap());
    }

    #[test]
    fn test_nutrition_coalesce_update_preserves_fields() {
        let db = Database::open_in_memory().unwrap();

        let dim = db
            .get_or_create_common_data("2024-01-15 00:00:00 -0500", "MyFitnessPal")
            .unwrap();

        let first = NutritionFacts {
            protein_g: Some(150.0),
            ..Default::default()
        };
        db.insert_nutrition(dim, &first).unwrap();

        let second = NutritionFacts {
            calories: Some(2200.0),
            ..Default::default()
        };
        db.update_nutrition(dim, &second).unwrap();

        let stored = db.get_nutrition(dim).unwrap().unwrap();
        assert_eq!(stored.protein_g, Some(150.0));
        assert_eq!(stored.calories, Some(2200.0));
        assert_eq!(stored.fat_g, None);
    }

    #[test]
    fn test_health_marker_coalesce_does_not_null_out() {
        let db = Database::open_in_memory().unwrap();

        let dim = db
            .get_or_create_common_data("2024-01-15 00:00:00 -0500", "Watch")
            .unwrap();

        let first = HealthMarkerFacts {
            body_weight: Some(181.2),
            vo2_max: Some(44.5),
            ..Default::default()
        };
        db.insert_health_markers(dim, &first).unwrap();

        let second = HealthMarkerFacts {
            vo2_max: Some(44.9),
            ..Default::default()
        };
        db.update_health_markers(dim, &second).unwrap();

        let stored = db.get_health_markers(dim).unwrap().unwrap();
        assert_eq!(stored.body_weight, Some(181.2));
        assert_eq!(stored.vo2_max, Some(44.9));
    }

    #[test]
    fn test_nutrition_range_filters_by_day() {
        let db = Database::open_in_memory().unwrap();

        for (date, protein) in [
            ("2024-01-14 00:00:00 -0500", 120.0),
            ("2024-01-15 00:00:00 -0500", 150.0),
            ("2024-01-16 00:00:00 -0500", 140.0),
        ] {
            let dim = db.get_or_create_common_data(date, "iPhone").unwrap();
            let facts = NutritionFacts {
                protein_g: Some(protein),
                ..Default::default()
            };
            db.insert_nutrition(dim, &facts).unwrap();
        }

        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let rows = db.nutrition_range(Some(day), Some(day)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].facts.protein_g, Some(150.0));

        let all = db.nutrition_range(None, None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_counts() {
        let db = Database::open_in_memory().unwrap();

        let dim = db
            .get_or_create_common_data("2024-01-15 08:30:00 -0500", "iPhone")
            .unwrap();
        let metric = db
            .get_or_create_metric("heart_rate", Some("bpm"), MetricCategory::HealthMarker)
            .unwrap();
        db.insert_raw_fact(dim, metric, Some(62.0), "{}").unwrap();

        let counts = db.counts().unwrap();
        assert_eq!(counts.dimensions, 1);
        assert_eq!(counts.metrics, 1);
        assert_eq!(counts.raw_facts, 1);
        assert_eq!(counts.sleep_sessions, 0);
    }

    #[test]
    fn test_transaction_rollback_on_drop() {
        let db = Database::open_in_memory().unwrap();

        {
            let _tx = db.begin().unwrap();
            db.get_or_create_common_data("2024-01-15 08:30:00 -0500", "iPhone")
                .unwrap();
            // dropped without commit
        }

        assert_eq!(db.counts().unwrap().dimensions, 0);
    }

    #[test]
    fn test_transaction_commit_persists() {
        let db = Database::open_in_memory().unwrap();

        let tx = db.begin().unwrap();
        db.get_or_create_common_data("2024-01-15 08:30:00 -0500", "iPhone")
            .unwrap();
        tx.commit().unwrap();

        assert_eq!(db.counts().unwrap().dimensions, 1);
    }
}
