//! Read-only report commands over the fact tables

use crate::error::Result;

use super::{cell, day_of, open_db, parse_day_opt};

/// List sleep sessions in a date range
pub fn sleep(from: Option<String>, to: Option<String>, db_path: Option<String>) -> Result<()> {
    let from = parse_day_opt(from.as_deref())?;
    let to = parse_day_opt(to.as_deref())?;
    let db = open_db(db_path)?;

    let sessions = db.sleep_range(from, to)?;
    if sessions.is_empty() {
        println!("No sleep sessions found.");
        return Ok(());
    }

    println!(
        "{:<12} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "Date", "In Bed", "Asleep", "Awake", "REM", "Deep", "Core"
    );
    println!("{}", "-".repeat(60));

    for s in &sessions {
        println!(
            "{:<12} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
            day_of(&s.start_time),
            cell(s.in_bed_hours),
            cell(s.asleep_hours),
            cell(s.awake_hours),
            cell(s.rem_hours),
            cell(s.deep_hours),
            cell(s.core_hours),
        );
    }

    Ok(())
}

/// List nutrition days in a date range
pub fn nutrition(from: Option<String>, to: Option<String>, db_path: Option<String>) -> Result<()> {
    let from = parse_day_opt(from.as_deref())?;
    let to = parse_day_opt(to.as_deref())?;
    let db = open_db(db_path)?;

    let days = db.nutrition_range(from, to)?;
    if days.is_empty() {
        println!("No nutrition data found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<14} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Date", "Source", "Calories", "Protein", "Carbs", "Fat", "Fiber"
    );
    println!("{}", "-".repeat(78));

    for day in &days {
        println!(
            "{:<12} {:<14} {:>9} {:>9} {:>9} {:>9} {:>9}",
            day_of(&day.date),
            day.source,
            cell(day.facts.calories),
            cell(day.facts.protein_g),
            cell(day.facts.carbohydrates_g),
            cell(day.facts.fat_g),
            cell(day.facts.fiber_g),
        );
    }

    Ok(())
}

/// List health-marker days in a date range
pub fn markers(from: Option<String>, to: Option<String>, db_path: Option<String>) -> Result<()> {
    let from = parse_day_opt(from.as_deref())?;
    let to = parse_day_opt(to.as_deref())?;
    let db = open_db(db_path)?;

    let days = db.health_marker_range(from, to)?;
    if days.is_empty() {
        println!("No health-marker data found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<14} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Date", "Source", "Weight", "BMI", "RHR", "HRV", "VO2max"
    );
    println!("{}", "-".repeat(74));

    for day in &days {
        println!(
            "{:<12} {:<14} {:>8} {:>8} {:>8} {:>8} {:>8}",
            day_of(&day.date),
            day.source,
            cell(day.facts.body_weight),
            cell(day.facts.body_mass_index),
            cell(day.facts.resting_heart_rate),
            cell(day.facts.heart_rate_variability),
            cell(day.facts.vo2_max),
        );
    }

    Ok(())
}
