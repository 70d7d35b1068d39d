//! Per-location forecast orchestration.
//!
//! [`PredictionService`] keeps one fitted model per location, keyed by a
//! fingerprint of the training series. A request whose fingerprint matches
//! the cached model is served without retraining; a mismatch retrains. When
//! retraining fails and an older model exists, that model answers instead
//! and the forecast is marked stale with the failure as the reason.
//!
//! Locations are independent: each has its own lock, so training for one
//! never blocks requests for another.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AqiReading, Forecast, Staleness, TrainingReport};
use crate::services::features::{build_features, normalize_location};
use crate::services::forecast::FittedModel;

/// Fingerprint of a training series.
///
/// Hashes the normalized location plus every (timestamp, value) pair, so
/// appended readings and corrections to past readings both change it.
/// Reading order does not matter.
pub fn series_fingerprint(location: &str, series: &[AqiReading]) -> String {
    let mut lines: Vec<String> = series
        .iter()
        .map(|reading| format!("{}:{}", reading.timestamp.timestamp(), reading.aqi_value))
        .collect();
    lines.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(normalize_location(location).as_bytes());
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Metadata about a location's cached model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Normalized location key.
    pub location: String,
    /// Fingerprint of the series the cached model was trained on.
    pub fingerprint: String,
    /// Number of fits performed for this location since startup.
    pub fit_count: u64,
    /// When the cached model was trained.
    pub trained_at: DateTime<Utc>,
    /// Diagnostics from that fit.
    pub report: TrainingReport,
}

struct CachedModel {
    fingerprint: String,
    model: Arc<FittedModel>,
    trained_at: DateTime<Utc>,
}

#[derive(Default)]
struct LocationState {
    cached: Option<CachedModel>,
    fit_count: u64,
}

/// Serves forecasts, retraining only when a location's history changes.
pub struct PredictionService {
    config: EngineConfig,
    locations: RwLock<HashMap<String, Arc<Mutex<LocationState>>>>,
}

impl PredictionService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            locations: RwLock::new(HashMap::new()),
        }
    }

    /// Forecast `horizon` days for a location given its full history.
    ///
    /// The series is fingerprinted first; only a changed fingerprint causes a
    /// retrain. Requests for the same location are serialized, requests for
    /// different locations run independently.
    pub fn get_forecast(
        &self,
        location: &str,
        series: &[AqiReading],
        horizon: usize,
    ) -> EngineResult<Forecast> {
        if horizon == 0 {
            return Err(EngineError::invalid_input(
                "forecast horizon must be at least 1 day",
            ));
        }

        let state_handle = self.location_state(location);
        let mut state = state_handle.lock();
        let fingerprint = series_fingerprint(location, series);

        let (model, used_fingerprint, staleness) = match &state.cached {
            Some(cached) if cached.fingerprint == fingerprint => {
                log::debug!("serving cached model for '{location}'");
                (
                    cached.model.clone(),
                    cached.fingerprint.clone(),
                    Staleness::Fresh,
                )
            }
            _ => match self.train(location, series, &fingerprint, &mut state) {
                Ok(model) => (model, fingerprint, Staleness::Fresh),
                Err(error) => match &state.cached {
                    Some(previous) => {
                        log::warn!(
                            "retrain failed for '{location}' ({error}), serving stale model"
                        );
                        (
                            previous.model.clone(),
                            previous.fingerprint.clone(),
                            Staleness::Stale {
                                reason: error.to_string(),
                            },
                        )
                    }
                    None => return Err(error),
                },
            },
        };

        let result = model.forecast(horizon)?;
        Ok(Forecast {
            result,
            staleness,
            model_fingerprint: used_fingerprint,
        })
    }

    /// Metadata about the cached model for a location, if one exists.
    pub fn model_info(&self, location: &str) -> Option<ModelInfo> {
        let key = normalize_location(location);
        let state_handle = self.locations.read().get(&key)?.clone();
        let state = state_handle.lock();
        state.cached.as_ref().map(|cached| ModelInfo {
            location: key.clone(),
            fingerprint: cached.fingerprint.clone(),
            fit_count: state.fit_count,
            trained_at: cached.trained_at,
            report: cached.model.report(),
        })
    }

    /// Drop the cached model for a location.
    pub fn invalidate(&self, location: &str) {
        let key = normalize_location(location);
        if let Some(state_handle) = self.locations.read().get(&key).cloned() {
            let mut state = state_handle.lock();
            state.cached = None;
        }
    }

    fn train(
        &self,
        location: &str,
        series: &[AqiReading],
        fingerprint: &str,
        state: &mut LocationState,
    ) -> EngineResult<Arc<FittedModel>> {
        let matrix = build_features(series, location, &self.config.features)?;
        let model = Arc::new(FittedModel::train(&matrix, &self.config)?);
        state.fit_count += 1;
        state.cached = Some(CachedModel {
            fingerprint: fingerprint.to_string(),
            model: model.clone(),
            trained_at: Utc::now(),
        });
        log::info!(
            "trained model for '{location}' on {} rows (fit #{})",
            matrix.len(),
            state.fit_count
        );
        Ok(model)
    }

    fn location_state(&self, location: &str) -> Arc<Mutex<LocationState>> {
        let key = normalize_location(location);
        if let Some(state) = self.locations.read().get(&key) {
            return state.clone();
        }
        self.locations.write().entry(key).or_default().clone()
    }
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
