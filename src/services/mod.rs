//! Service layer for classification, recommendations and forecasting.
//!
//! Services are pure computations over caller-supplied data. The only
//! stateful component is [`orchestrator::PredictionService`], which caches
//! fitted models per location.

pub mod classifier;
pub mod features;
pub mod forecast;
pub mod history;
pub mod orchestrator;
pub mod planner;
pub mod recommendations;


#[cfg(test)]
#[path = "forecast_tests.rs"]
mod forecast_tests;

pub use classifier::{aqi_from_pollutants, classify, classify_value};
pub use features::build_features;
pub use forecast::{FittedModel, Forecaster};
pub use history::summarize;
pub use orchestrator::{series_fingerprint, ModelInfo, PredictionService};
pub use planner::plan_activities;
pub use recommendations::{pollutant_advice, recommend};
