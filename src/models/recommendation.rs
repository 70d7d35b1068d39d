//! Recommendation outputs.

use serde::{Deserialize, Serialize};

use crate::models::severity::SeverityBand;

/// Advice computed for one request. Derived output, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    /// Band the request's AQI value falls in.
    pub band: SeverityBand,
    /// General advice that applies to everyone at this band.
    pub base_advice: Vec<String>,
    /// Advice added for the profile's conditions, age group and activity
    /// level, in profile order.
    pub personalized_advice: Vec<String>,
    /// Protective measures for sensitive profiles at elevated bands. Grows
    /// with band severity and is empty below Unhealthy for Sensitive Groups.
    pub protective_measures: Vec<String>,
}

impl RecommendationSet {
    /// Total number of advice lines across all sections.
    pub fn advice_count(&self) -> usize {
        self.base_advice.len() + self.personalized_advice.len() + self.protective_measures.len()
    }
}

/// Concentration-specific guidance for a single pollutant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantAdvice {
    /// Normalized pollutant name (`pm25`, `pm10`, `o3`).
    pub pollutant: String,
    /// Concentration the guidance was derived from.
    pub concentration: f64,
    /// Guidance text for this concentration level.
    pub guidance: String,
}
