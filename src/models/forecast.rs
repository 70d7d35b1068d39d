//! Forecasting data model.
//!
//! [`FeatureRow`] and [`FeatureMatrix`] are the contract between the feature
//! builder and the forecast model; [`ForecastResult`] and [`Forecast`] are
//! what callers get back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::severity::SeverityBand;

/// One derived feature row for a reconstructed daily timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Day this row describes.
    pub date: NaiveDate,
    /// AQI values `lag` days back, in configured lag order.
    pub lags: Vec<f64>,
    /// Day of week, Monday = 0.
    pub day_of_week: u32,
    /// Calendar month, 1 to 12.
    pub month: u32,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Mean AQI over the trailing window of prior days. Expands from the
    /// series start while fewer prior days exist.
    pub rolling_mean: f64,
    /// Sample std over the same trailing window, 0.0 for a single prior day.
    pub rolling_std: f64,
}

impl FeatureRow {
    /// Flatten into the numeric layout the model trains on: calendar
    /// features, rolling statistics, then lags.
    pub fn to_vector(&self) -> Vec<f64> {
        let mut vector = Vec::with_capacity(5 + self.lags.len());
        vector.push(f64::from(self.day_of_week));
        vector.push(f64::from(self.month));
        vector.push(if self.is_weekend { 1.0 } else { 0.0 });
        vector.push(self.rolling_mean);
        vector.push(self.rolling_std);
        vector.extend_from_slice(&self.lags);
        vector
    }
}

/// Feature rows paired with their target AQI values, plus the gap-filled
/// daily series they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    /// Derived rows, in date order.
    pub rows: Vec<FeatureRow>,
    /// Target AQI per row, parallel to `rows`.
    pub targets: Vec<f64>,
    /// Complete reconstructed daily series, gap-filled, oldest first.
    pub series: Vec<f64>,
    /// Date of the first entry in `series`.
    pub series_start: NaiveDate,
    /// Number of days in `series` that were imputed rather than observed.
    pub imputed_days: usize,
}

impl FeatureMatrix {
    /// Number of usable rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Numeric forecast over a daily horizon. The four sequences are parallel
/// and ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Forecast dates, consecutive days after the last training day.
    pub horizon_dates: Vec<NaiveDate>,
    /// Ensemble mean per day, clamped at zero.
    pub point_estimates: Vec<f64>,
    /// Lower confidence bound per day, clamped at zero.
    pub lower_bound: Vec<f64>,
    /// Upper confidence bound per day.
    pub upper_bound: Vec<f64>,
}

impl ForecastResult {
    /// Horizon length in days.
    pub fn len(&self) -> usize {
        self.horizon_dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.horizon_dates.is_empty()
    }
}

/// Whether a served forecast reflects the latest supplied history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Staleness {
    /// The model was trained on exactly the history supplied.
    Fresh,
    /// The model predates the supplied history; retraining failed for the
    /// recorded reason.
    Stale {
        reason: String,
    },
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Staleness::Stale { .. })
    }
}

/// A served forecast plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// The numeric forecast.
    pub result: ForecastResult,
    /// Freshness of the model that produced it.
    pub staleness: Staleness,
    /// Fingerprint of the training series the model was fitted on.
    pub model_fingerprint: String,
}

/// In-sample fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Feature rows the fit consumed.
    pub rows_used: usize,
    /// Mean squared error of the ensemble over the training rows.
    pub mse: f64,
    /// Coefficient of determination over the training rows.
    pub r_squared: f64,
}

/// One forecast day annotated for planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedDay {
    pub date: NaiveDate,
    /// Forecast point estimate for the day.
    pub aqi: f64,
    /// Band the estimate falls in.
    pub band: SeverityBand,
}

/// Day-by-day activity plan derived from a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPlan {
    /// Every forecast day, annotated, in date order.
    pub days: Vec<PlannedDay>,
    /// Day with the lowest forecast AQI. First such day on ties.
    pub best_day: NaiveDate,
    /// Day with the highest forecast AQI. First such day on ties.
    pub caution_day: NaiveDate,
    /// Days suitable for the profile's outdoor activity, in date order.
    pub recommended_days: Vec<NaiveDate>,
    /// Set when the profile wanted outdoor activity but no day qualifies.
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_layout() {
        let row = FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            lags: vec![61.0, 58.0, 47.0],
            day_of_week: 5,
            month: 3,
            is_weekend: true,
            rolling_mean: 55.5,
            rolling_std: 4.2,
        };
        assert_eq!(
            row.to_vector(),
            vec![5.0, 3.0, 1.0, 55.5, 4.2, 61.0, 58.0, 47.0]
        );
    }

    #[test]
    fn test_staleness_flag() {
        assert!(!Staleness::Fresh.is_stale());
        assert!(Staleness::Stale {
            reason: "insufficient data".to_string()
        }
        .is_stale());
    }
}
