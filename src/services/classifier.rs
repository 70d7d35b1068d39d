//! AQI severity classification and pollutant-derived index values.

use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::SeverityBand;

/// AQI value reported when no usable pollutant concentration is present.
const DEFAULT_AQI: i64 = 50;

/// Cap applied to the NO2 and O3 approximations.
const APPROXIMATION_CAP: i64 = 300;

/// Classify a non-negative AQI value into its severity band.
///
/// Boundaries are inclusive on both sides: 0-50 Good, 51-100 Moderate,
/// 101-150 Unhealthy for Sensitive Groups, 151-200 Unhealthy, 201-300 Very
/// Unhealthy, 301 and above Hazardous. Negative values are rejected rather
/// than clamped.
pub fn classify(aqi_value: i64) -> EngineResult<SeverityBand> {
    if aqi_value < 0 {
        return Err(EngineError::invalid_input(format!(
            "AQI value must be non-negative, got {aqi_value}"
        )));
    }
    Ok(match aqi_value {
        0..=50 => SeverityBand::Good,
        51..=100 => SeverityBand::Moderate,
        101..=150 => SeverityBand::UnhealthySensitive,
        151..=200 => SeverityBand::Unhealthy,
        201..=300 => SeverityBand::VeryUnhealthy,
        _ => SeverityBand::Hazardous,
    })
}

/// Classify a fractional AQI value, such as a forecast estimate or a mean.
///
/// Uses the same thresholds with `<=` comparisons, so 50.4 already falls in
/// Moderate.
pub fn classify_value(aqi_value: f64) -> EngineResult<SeverityBand> {
    if !aqi_value.is_finite() || aqi_value < 0.0 {
        return Err(EngineError::invalid_input(format!(
            "AQI value must be finite and non-negative, got {aqi_value}"
        )));
    }
    Ok(if aqi_value <= 50.0 {
        SeverityBand::Good
    } else if aqi_value <= 100.0 {
        SeverityBand::Moderate
    } else if aqi_value <= 150.0 {
        SeverityBand::UnhealthySensitive
    } else if aqi_value <= 200.0 {
        SeverityBand::Unhealthy
    } else if aqi_value <= 300.0 {
        SeverityBand::VeryUnhealthy
    } else {
        SeverityBand::Hazardous
    })
}

/// Derive an AQI value from a pollutant concentration map.
///
/// PM2.5 is preferred, then PM10 with its own breakpoints, then doubled NO2
/// and scaled O3 as capped approximations. An empty or unusable map yields
/// the moderate-air default of 50. Keys are matched case-insensitively and
/// ignoring dots, so `PM2.5` and `pm25` are the same pollutant.
pub fn aqi_from_pollutants(pollutants: &BTreeMap<String, f64>) -> i64 {
    if let Some(pm25) = find_concentration(pollutants, "pm25") {
        return pm25_to_aqi(pm25);
    }
    if let Some(pm10) = find_concentration(pollutants, "pm10") {
        return pm10_to_aqi(pm10);
    }
    if let Some(no2) = find_concentration(pollutants, "no2") {
        return ((no2 * 2.0) as i64).min(APPROXIMATION_CAP);
    }
    if let Some(o3) = find_concentration(pollutants, "o3") {
        return ((o3 * 1.5) as i64).min(APPROXIMATION_CAP);
    }
    log::debug!("no usable pollutant concentration, falling back to AQI {DEFAULT_AQI}");
    DEFAULT_AQI
}

/// Normalize a pollutant key for lookup: lowercase, dots stripped.
pub(crate) fn normalize_pollutant(name: &str) -> String {
    name.trim().to_lowercase().replace('.', "")
}

/// Find a usable concentration for the given normalized pollutant name.
/// Non-finite and negative concentrations are ignored.
pub(crate) fn find_concentration(pollutants: &BTreeMap<String, f64>, name: &str) -> Option<f64> {
    for (key, value) in pollutants {
        if normalize_pollutant(key) == name && value.is_finite() && *value >= 0.0 {
            return Some(*value);
        }
    }
    None
}

/// Piecewise-linear PM2.5 breakpoints, truncated to an integer AQI.
fn pm25_to_aqi(pm25: f64) -> i64 {
    let aqi = if pm25 <= 12.0 {
        50.0 * pm25 / 12.0
    } else if pm25 <= 35.4 {
        50.0 + 50.0 * (pm25 - 12.0) / 23.4
    } else if pm25 <= 55.4 {
        100.0 + 50.0 * (pm25 - 35.4) / 20.0
    } else if pm25 <= 150.4 {
        150.0 + 50.0 * (pm25 - 55.4) / 95.0
    } else if pm25 <= 250.4 {
        200.0 + 100.0 * (pm25 - 150.4) / 100.0
    } else {
        300.0 + 200.0 * (pm25 - 250.4) / 250.0
    };
    aqi as i64
}

/// Piecewise-linear PM10 breakpoints, truncated to an integer AQI.
fn pm10_to_aqi(pm10: f64) -> i64 {
    let aqi = if pm10 <= 54.0 {
        50.0 * pm10 / 54.0
    } else if pm10 <= 154.0 {
        50.0 + 50.0 * (pm10 - 54.0) / 100.0
    } else if pm10 <= 254.0 {
        100.0 + 50.0 * (pm10 - 154.0) / 100.0
    } else if pm10 <= 354.0 {
        150.0 + 50.0 * (pm10 - 254.0) / 100.0
    } else if pm10 <= 424.0 {
        200.0 + 100.0 * (pm10 - 354.0) / 70.0
    } else {
        300.0 + 200.0 * (pm10 - 424.0) / 176.0
    };
    aqi as i64
}
