//! Feature derivation for the forecasting pipeline.
//!
//! Raw readings become a gap-free daily series first: readings are matched to
//! the requested location, same-day duplicates collapse to their mean, the
//! timeline is reindexed to consecutive days, interior gaps are linearly
//! interpolated and edge gaps take the nearest observed value. Calendar,
//! rolling and lag features are then derived per day.
//!
//! Rolling statistics only look at days strictly before the row's date, so a
//! row never sees its own target.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::config::FeatureConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AqiReading, FeatureMatrix, FeatureRow};

/// Normalize a location name for matching and cache keys.
pub(crate) fn normalize_location(location: &str) -> String {
    location.trim().to_lowercase()
}

/// Build the model-ready feature matrix for one location.
///
/// Fails with `InvalidInput` when no reading matches the location or a
/// reading carries a negative AQI, and with `InsufficientData` when fewer
/// than `config.min_rows` rows survive the lag cutoff.
pub fn build_features(
    series: &[AqiReading],
    location: &str,
    config: &FeatureConfig,
) -> EngineResult<FeatureMatrix> {
    if config.lags.is_empty() || config.lags.iter().any(|&lag| lag == 0) {
        return Err(EngineError::invalid_input(
            "lag offsets must be non-empty and >= 1",
        ));
    }
    if config.rolling_window == 0 {
        return Err(EngineError::invalid_input("rolling_window must be >= 1"));
    }
    if config.min_rows == 0 {
        return Err(EngineError::invalid_input("min_rows must be >= 1"));
    }

    let daily = daily_series(series, location)?;
    let start = daily[0].0;
    let end = daily[daily.len() - 1].0;
    let day_count = end.signed_duration_since(start).num_days() as usize + 1;

    // Reindex onto a dense daily timeline, then fill the holes.
    let mut sparse: Vec<Option<f64>> = vec![None; day_count];
    for (date, value) in &daily {
        let offset = date.signed_duration_since(start).num_days() as usize;
        sparse[offset] = Some(*value);
    }
    let (values, imputed_days) = impute_series(&sparse);
    if imputed_days > 0 {
        log::debug!(
            "imputed {imputed_days} of {day_count} days for location '{location}'"
        );
    }

    let max_lag = config.max_lag();
    let mut rows = Vec::new();
    let mut targets = Vec::new();
    for index in max_lag..values.len() {
        let date = start + Duration::days(index as i64);
        let lags: Vec<f64> = config.lags.iter().map(|&lag| values[index - lag]).collect();
        let (rolling_mean, rolling_std) = rolling_stats(&values, index, config.rolling_window);
        let day_of_week = date.weekday().num_days_from_monday();
        rows.push(FeatureRow {
            date,
            lags,
            day_of_week,
            month: date.month(),
            is_weekend: day_of_week >= 5,
            rolling_mean,
            rolling_std,
        });
        targets.push(values[index]);
    }

    if rows.len() < config.min_rows {
        return Err(EngineError::insufficient_data(config.min_rows, rows.len()));
    }

    Ok(FeatureMatrix {
        rows,
        targets,
        series: values,
        series_start: start,
        imputed_days,
    })
}

/// Collapse readings for one location into a sorted (date, mean AQI) series.
fn daily_series(series: &[AqiReading], location: &str) -> EngineResult<Vec<(NaiveDate, f64)>> {
    let wanted = normalize_location(location);
    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for reading in series {
        if normalize_location(&reading.location) != wanted {
            continue;
        }
        if reading.aqi_value < 0 {
            return Err(EngineError::invalid_input(format!(
                "reading at {} has negative AQI {}",
                reading.timestamp, reading.aqi_value
            )));
        }
        let entry = by_day.entry(reading.timestamp.date_naive()).or_insert((0.0, 0));
        entry.0 += reading.aqi_value as f64;
        entry.1 += 1;
    }

    if by_day.is_empty() {
        return Err(EngineError::invalid_input(format!(
            "no readings for location '{location}'"
        )));
    }

    Ok(by_day
        .into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect())
}

/// Densify a sparse daily series.
///
/// Interior gaps are linearly interpolated between their bracketing
/// observations; gaps before the first or after the last observation take
/// that nearest value. Returns the dense series and the number of imputed
/// entries.
pub(crate) fn impute_series(sparse: &[Option<f64>]) -> (Vec<f64>, usize) {
    let known: Vec<(usize, f64)> = sparse
        .iter()
        .enumerate()
        .filter_map(|(index, value)| value.map(|v| (index, v)))
        .collect();
    if known.is_empty() {
        return (Vec::new(), 0);
    }

    let first = known[0];
    let last = known[known.len() - 1];
    let mut dense = Vec::with_capacity(sparse.len());
    let mut imputed = 0;
    let mut prev = first;
    let mut next = 0;

    for (index, value) in sparse.iter().enumerate() {
        if let Some(v) = *value {
            dense.push(v);
            prev = (index, v);
            while next < known.len() && known[next].0 <= index {
                next += 1;
            }
            continue;
        }
        imputed += 1;
        if index < first.0 {
            dense.push(first.1);
        } else if index > last.0 {
            dense.push(last.1);
        } else {
            let (later_index, later_value) = known[next];
            let fraction = (index - prev.0) as f64 / (later_index - prev.0) as f64;
            dense.push(prev.1 + (later_value - prev.1) * fraction);
        }
    }

    (dense, imputed)
}

/// Mean and sample std over the window of days strictly before `index`,
/// expanding from the series start while fewer prior days exist. A single
/// prior day yields a std of 0.0.
pub(crate) fn rolling_stats(series: &[f64], index: usize, window: usize) -> (f64, f64) {
    let start = index.saturating_sub(window);
    let prior = &series[start..index.min(series.len())];
    if prior.is_empty() {
        let fallback = series.first().copied().unwrap_or(0.0);
        return (fallback, 0.0);
    }
    let mean = prior.iter().sum::<f64>() / prior.len() as f64;
    let std = if prior.len() >= 2 {
        let variance = prior.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (prior.len() - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };
    (mean, std)
}
