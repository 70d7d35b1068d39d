//! Historical summaries.

use crate::error::{EngineError, EngineResult};
use crate::models::{AqiReading, HistorySummary, SeverityBand};
use crate::services::classifier::{classify, classify_value};
use crate::services::features::normalize_location;

/// Summarize one location's readings.
///
/// Every band appears in the per-band counts, zero or not, so callers can
/// render a stable distribution. Fails with `InvalidInput` when no reading
/// matches the location or a reading carries a negative AQI.
pub fn summarize(series: &[AqiReading], location: &str) -> EngineResult<HistorySummary> {
    let wanted = normalize_location(location);
    let matching: Vec<&AqiReading> = series
        .iter()
        .filter(|reading| normalize_location(&reading.location) == wanted)
        .collect();

    if matching.is_empty() {
        return Err(EngineError::invalid_input(format!(
            "no readings for location '{location}'"
        )));
    }

    let mut band_tally = [0usize; 6];
    let mut sum = 0.0;
    let mut min_aqi = i64::MAX;
    let mut max_aqi = i64::MIN;
    for reading in &matching {
        let band = classify(reading.aqi_value)?;
        band_tally[band as usize] += 1;
        sum += reading.aqi_value as f64;
        min_aqi = min_aqi.min(reading.aqi_value);
        max_aqi = max_aqi.max(reading.aqi_value);
    }

    let mean_aqi = (sum / matching.len() as f64 * 10.0).round() / 10.0;
    let band_counts: Vec<(SeverityBand, usize)> = SeverityBand::ALL
        .iter()
        .map(|band| (*band, band_tally[*band as usize]))
        .collect();
    let mut most_common_band = SeverityBand::Good;
    for (band, count) in &band_counts {
        if *count > band_tally[most_common_band as usize] {
            most_common_band = *band;
        }
    }

    Ok(HistorySummary {
        location: wanted,
        reading_count: matching.len(),
        mean_aqi,
        min_aqi,
        max_aqi,
        mean_band: classify_value(mean_aqi)?,
        most_common_band,
        band_counts,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn create_series(location: &str, values: &[i64]) -> Vec<AqiReading> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(day, value)| {
                AqiReading::new(location, base + Duration::days(day as i64), *value)
            })
            .collect()
    }

    #[test]
    fn test_summary_statistics() {
        let series = create_series("Madrid", &[40, 55, 160, 45]);
        let summary = summarize(&series, "Madrid").unwrap();

        assert_eq!(summary.location, "madrid");
        assert_eq!(summary.reading_count, 4);
        assert_eq!(summary.mean_aqi, 75.0);
        assert_eq!(summary.min_aqi, 40);
        assert_eq!(summary.max_aqi, 160);
        assert_eq!(summary.mean_band, SeverityBand::Moderate);
        assert_eq!(summary.most_common_band, SeverityBand::Good);
    }

    #[test]
    fn test_most_common_band_prefers_less_severe_on_ties() {
        let series = create_series("Madrid", &[40, 120]);
        let summary = summarize(&series, "Madrid").unwrap();
        assert_eq!(summary.most_common_band, SeverityBand::Good);

        let series = create_series("Madrid", &[60, 210, 220]);
        let summary = summarize(&series, "Madrid").unwrap();
        assert_eq!(summary.most_common_band, SeverityBand::VeryUnhealthy);
    }

    #[test]
    fn test_band_counts_include_empty_bands() {
        let series = create_series("Madrid", &[40, 45, 120]);
        let summary = summarize(&series, "Madrid").unwrap();

        assert_eq!(summary.band_counts.len(), 6);
        assert_eq!(summary.band_counts[0], (SeverityBand::Good, 2));
        assert_eq!(summary.band_counts[1], (SeverityBand::Moderate, 0));
        assert_eq!(
            summary.band_counts[2],
            (SeverityBand::UnhealthySensitive, 1)
        );
        assert_eq!(summary.band_counts[5], (SeverityBand::Hazardous, 0));
    }

    #[test]
    fn test_mean_is_rounded_to_one_decimal() {
        let series = create_series("Madrid", &[40, 41, 41]);
        let summary = summarize(&series, "Madrid").unwrap();
        assert_eq!(summary.mean_aqi, 40.7);
    }

    #[test]
    fn test_other_locations_are_ignored() {
        let mut series = create_series("Madrid", &[40, 50]);
        series.extend(create_series("Lisbon", &[200, 250]));
        let summary = summarize(&series, "madrid").unwrap();
        assert_eq!(summary.reading_count, 2);
        assert_eq!(summary.max_aqi, 50);
    }

    #[test]
    fn test_unknown_location_fails() {
        let series = create_series("Madrid", &[40]);
        let err = summarize(&series, "Porto").unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_reading_rejected() {
        let mut series = create_series("Madrid", &[40, 50]);
        series[1].aqi_value = -2;
        let err = summarize(&series, "Madrid").unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
