//! Example walking through a full daily air quality briefing
//!
//! This example shows how to use the engine to:
//! 1. Summarize a location's reading history
//! 2. Derive an AQI from raw pollutant concentrations
//! 3. Build personalized recommendations for a health profile
//! 4. Forecast the week ahead
//! 5. Plan outdoor activities from the forecast
//!
//! To run this example:
//! ```bash
//! cargo run --example daily_briefing
//! ```

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};

use airqual_core::models::{ActivityLevel, AgeGroup, AqiReading, HealthCondition, HealthProfile};
use airqual_core::services::{
    aqi_from_pollutants, plan_activities, pollutant_advice, recommend, summarize,
    PredictionService,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Air Quality Daily Briefing ===\n");

    // Step 1: Summarize the reading history
    println!("1. Summarizing reading history...");
    let history = sample_history("Madrid", 42);
    let summary = summarize(&history, "Madrid")?;
    println!(
        "   {} readings for '{}': mean AQI {:.1} ({}), range {} to {}",
        summary.reading_count,
        summary.location,
        summary.mean_aqi,
        summary.mean_band.label(),
        summary.min_aqi,
        summary.max_aqi
    );
    println!("   Most common band: {}", summary.most_common_band.label());
    println!("   Distribution:");
    for (band, count) in &summary.band_counts {
        if *count > 0 {
            println!("     {:<30} {:>3}", band.label(), count);
        }
    }
    println!();

    // Step 2: Derive today's AQI from raw concentrations
    println!("2. Classifying today's measurements...");
    let mut measured = BTreeMap::new();
    measured.insert("PM2.5".to_string(), 48.2);
    measured.insert("NO2".to_string(), 61.0);
    let today = aqi_from_pollutants(&measured);
    println!("   Measured: PM2.5 48.2 µg/m³, NO2 61.0 µg/m³");
    println!("   Derived AQI: {today}\n");

    // Step 3: Build recommendations for a sensitive profile
    println!("3. Building recommendations...");
    let profile = HealthProfile::new(AgeGroup::Elderly, ActivityLevel::Moderate)
        .with_condition(HealthCondition::Respiratory);
    let advice = recommend(today, Some(&profile))?;

    println!("   Band: {} ({})", advice.band.label(), advice.band.color());
    println!("   General:");
    for line in &advice.base_advice {
        println!("   • {line}");
    }
    if !advice.personalized_advice.is_empty() {
        println!("   For this profile:");
        for line in &advice.personalized_advice {
            println!("   • {line}");
        }
    }
    if !advice.protective_measures.is_empty() {
        println!("   Protective measures:");
        for line in &advice.protective_measures {
            println!("   • {line}");
        }
    }
    for item in pollutant_advice(&measured) {
        println!(
            "   {} at {:.1}: {}",
            item.pollutant, item.concentration, item.guidance
        );
    }
    println!();

    // Step 4: Forecast the week ahead
    println!("4. Forecasting the week ahead...");
    let service = PredictionService::default();
    let forecast = service.get_forecast("Madrid", &history, 7)?;
    let info = service
        .model_info("Madrid")
        .ok_or("model metadata missing after training")?;

    println!(
        "   Trained on {} rows, R² {:.3}, fingerprint {}…",
        info.report.rows_used,
        info.report.r_squared,
        &info.fingerprint[..12]
    );
    if forecast.staleness.is_stale() {
        println!("   (served from a stale model)");
    }
    for day in 0..forecast.result.len() {
        println!(
            "   {}  AQI {:>5.1}  range [{:>5.1}, {:>5.1}]",
            forecast.result.horizon_dates[day],
            forecast.result.point_estimates[day],
            forecast.result.lower_bound[day],
            forecast.result.upper_bound[day],
        );
    }
    println!();

    // Step 5: Plan the week's outdoor activities
    println!("5. Planning outdoor activities...\n");
    let plan = plan_activities(&forecast.result, Some(&profile))?;

    println!("   Best day:    {}", plan.best_day);
    println!("   Caution day: {}", plan.caution_day);
    if !plan.recommended_days.is_empty() {
        println!("   Good for outdoor activity:");
        for date in &plan.recommended_days {
            println!("   • {date}");
        }
    }
    if let Some(note) = &plan.note {
        println!("   Note: {note}");
    }
    println!();

    println!("=== Briefing Complete ===");

    Ok(())
}

/// Six weeks of plausible readings: a weekly shape plus a slow drift.
fn sample_history(location: &str, days: usize) -> Vec<AqiReading> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    (0..days)
        .map(|day| {
            let weekly = [48, 55, 61, 66, 62, 54, 50][day % 7];
            let drift = (day / 10) as i64;
            AqiReading::new(location, base + Duration::days(day as i64), weekly + drift)
        })
        .collect()
}
