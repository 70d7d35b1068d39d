//! End-to-end tests of classification and recommendations through the
//! public API.

use chrono::{Duration, TimeZone, Utc};

use airqual_core::models::{
    ActivityLevel, AgeGroup, AqiReading, HealthCondition, HealthProfile, SeverityBand,
};
use airqual_core::services::{
    aqi_from_pollutants, classify, pollutant_advice, recommend, summarize,
};
use airqual_core::EngineError;

fn create_history(location: &str, values: &[i64]) -> Vec<AqiReading> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(day, value)| AqiReading::new(location, base + Duration::days(day as i64), *value))
        .collect()
}

#[test]
fn test_reading_with_pollutants_to_recommendations() {
    let reading = AqiReading::new(
        "Madrid",
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        0,
    )
    .with_pollutant("PM2.5", 48.0)
    .with_pollutant("o3", 60.0);

    let aqi = aqi_from_pollutants(&reading.pollutants);
    assert_eq!(classify(aqi).unwrap(), SeverityBand::UnhealthySensitive);

    let profile = HealthProfile::new(AgeGroup::Elderly, ActivityLevel::Low)
        .with_condition(HealthCondition::Respiratory);
    let set = recommend(aqi, Some(&profile)).unwrap();

    assert_eq!(set.band, SeverityBand::UnhealthySensitive);
    assert!(!set.base_advice.is_empty());
    assert!(set.personalized_advice.len() >= 2);
    assert!(!set.protective_measures.is_empty());

    let advice = pollutant_advice(&reading.pollutants);
    assert_eq!(advice.len(), 2);
    assert_eq!(advice[0].pollutant, "pm25");
    assert_eq!(advice[1].pollutant, "o3");
}

#[test]
fn test_protection_scales_with_severity_through_the_api() {
    let grandparent = HealthProfile::new(AgeGroup::Elderly, ActivityLevel::Low);
    let mut previous = 0;
    for aqi in [30, 80, 130, 180, 250, 400] {
        let set = recommend(aqi, Some(&grandparent)).unwrap();
        assert!(
            set.protective_measures.len() >= previous,
            "protection shrank at AQI {aqi}"
        );
        previous = set.protective_measures.len();
    }
    assert!(previous > 0);
}

#[test]
fn test_identical_requests_serialize_identically() {
    let profile = HealthProfile::new(AgeGroup::Adult, ActivityLevel::High)
        .with_condition(HealthCondition::Allergy)
        .with_condition(HealthCondition::Pregnancy);

    let first = serde_json::to_string(&recommend(165, Some(&profile)).unwrap()).unwrap();
    let second = serde_json::to_string(&recommend(165, Some(&profile)).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_recommendation_payload_shape() {
    let set = recommend(205, None).unwrap();
    let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&set).unwrap())
        .unwrap();

    assert_eq!(json["band"], "VeryUnhealthy");
    assert!(json["base_advice"].is_array());
    assert!(json["personalized_advice"].as_array().unwrap().is_empty());
}

#[test]
fn test_invalid_values_rejected_at_the_boundary() {
    assert!(matches!(
        classify(-1).unwrap_err(),
        EngineError::InvalidInput(_)
    ));
    assert!(matches!(
        recommend(-42, None).unwrap_err(),
        EngineError::InvalidInput(_)
    ));
}

#[test]
fn test_history_summary_drives_recommendations() {
    let history = create_history("Madrid", &[95, 110, 140, 150, 125, 105]);
    let summary = summarize(&history, "Madrid").unwrap();

    assert_eq!(summary.reading_count, 6);
    assert_eq!(summary.mean_band, SeverityBand::UnhealthySensitive);
    assert_eq!(summary.max_aqi, 150);

    // A caller can feed the observed worst case straight into the engine.
    let cautious = recommend(summary.max_aqi, None).unwrap();
    assert_eq!(cautious.band, SeverityBand::UnhealthySensitive);
}

#[test]
fn test_band_colors_for_dashboard_rendering() {
    let bands: Vec<SeverityBand> = [20, 70, 120, 170, 250, 500]
        .iter()
        .map(|&aqi| classify(aqi).unwrap())
        .collect();
    let colors: Vec<&str> = bands.iter().map(|band| band.color()).collect();

    assert_eq!(colors.len(), 6);
    assert_eq!(colors[0], "#4CAF50");
    assert_eq!(colors[5], "#800000");
    // All six bands render distinctly.
    let mut unique = colors.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 6);
}
