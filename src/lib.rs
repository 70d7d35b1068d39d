//! # AirQual Core Engine
//!
//! In-memory analytics core of the AirQual air-quality monitoring system.
//!
//! This crate turns historical AQI readings into severity classifications,
//! personalized health recommendations and short-horizon forecasts. It holds
//! no I/O: callers fetch readings, hand them in, and persist whatever they
//! want of the results. Every operation is deterministic for a given input
//! and configuration, including model training, which is seeded.
//!
//! ## Features
//!
//! - **Classification**: Map AQI values onto the six standard severity bands
//! - **Recommendations**: Table-driven health advice, tailored by condition,
//!   age group and activity level
//! - **Feature Building**: Gap-filled daily series with calendar, rolling
//!   and lag features
//! - **Forecasting**: Seeded tree ensemble with dispersion-based confidence
//!   bounds
//! - **Orchestration**: Per-location model cache keyed by a fingerprint of
//!   the training series
//!
//! ## Architecture
//!
//! The crate is organized into a few logical modules:
//!
//! - [`models`]: Readings, profiles, bands and result types
//! - [`services`]: Classification, recommendation and forecasting logic
//! - [`config`]: Engine configuration with TOML overrides
//! - [`error`]: The recoverable error taxonomy
//!
//! ## Example
//!
//! ```
//! use airqual_core::services::{classify, recommend};
//!
//! let band = classify(135).unwrap();
//! let advice = recommend(135, None).unwrap();
//! assert_eq!(advice.band, band);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::{EngineConfig, FeatureConfig, ForestConfig};
pub use error::{EngineError, EngineResult};
