//! Historical AQI readings and their summary statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::severity::SeverityBand;

/// One recorded AQI observation for a location.
///
/// Readings are immutable facts supplied by the caller; the engine only ever
/// reads them. The pollutant breakdown is optional and keyed by pollutant
/// name (`pm25`, `pm10`, `no2`, `o3`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiReading {
    /// Location the observation belongs to.
    pub location: String,
    /// When the observation was taken.
    pub timestamp: DateTime<Utc>,
    /// Composite AQI value, non-negative by contract.
    pub aqi_value: i64,
    /// Pollutant name to concentration, when the source provided a breakdown.
    #[serde(default)]
    pub pollutants: BTreeMap<String, f64>,
}

impl AqiReading {
    /// Create a reading without a pollutant breakdown.
    pub fn new(location: impl Into<String>, timestamp: DateTime<Utc>, aqi_value: i64) -> Self {
        Self {
            location: location.into(),
            timestamp,
            aqi_value,
            pollutants: BTreeMap::new(),
        }
    }

    /// Attach a pollutant concentration.
    pub fn with_pollutant(mut self, name: impl Into<String>, concentration: f64) -> Self {
        self.pollutants.insert(name.into(), concentration);
        self
    }
}

/// Aggregate statistics over one location's readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Location the summary covers.
    pub location: String,
    /// Number of readings aggregated.
    pub reading_count: usize,
    /// Mean AQI, rounded to one decimal.
    pub mean_aqi: f64,
    /// Lowest recorded AQI.
    pub min_aqi: i64,
    /// Highest recorded AQI.
    pub max_aqi: i64,
    /// Band the mean AQI falls in.
    pub mean_band: SeverityBand,
    /// Band with the most readings. Ties go to the less severe band.
    pub most_common_band: SeverityBand,
    /// Reading count per band, in band order. Bands with no readings are
    /// included with a count of zero.
    pub band_counts: Vec<(SeverityBand, usize)>,
}
