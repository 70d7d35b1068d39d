//! Engine configuration.
//!
//! Defaults mirror the reference deployment: a daily series, a 7-day rolling
//! window, lag offsets of 1, 2 and 7 days and a 50-tree forest seeded for
//! reproducibility. Any field can be overridden from a TOML file; omitted
//! fields keep their defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

fn default_rolling_window() -> usize {
    7
}

fn default_lags() -> Vec<usize> {
    vec![1, 2, 7]
}

fn default_min_rows() -> usize {
    10
}

fn default_tree_count() -> usize {
    50
}

fn default_max_depth() -> usize {
    8
}

fn default_min_samples_split() -> usize {
    4
}

fn default_min_samples_leaf() -> usize {
    2
}

fn default_min_training_rows() -> usize {
    10
}

fn default_seed() -> u64 {
    42
}

/// Settings for the feature derivation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Trailing window length, in days, for rolling mean and std.
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    /// Lag offsets, in days, turned into lag features. Must be >= 1.
    #[serde(default = "default_lags")]
    pub lags: Vec<usize>,
    /// Minimum feature rows the builder must be able to produce.
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            rolling_window: default_rolling_window(),
            lags: default_lags(),
            min_rows: default_min_rows(),
        }
    }
}

impl FeatureConfig {
    /// Largest configured lag offset.
    pub fn max_lag(&self) -> usize {
        self.lags.iter().copied().max().unwrap_or(0)
    }
}

/// Settings for the tree ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees grown per fit.
    #[serde(default = "default_tree_count")]
    pub tree_count: usize,
    /// Maximum tree depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum rows a node needs before a split is attempted.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Minimum rows each child of a split must keep.
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Minimum training rows a fit will accept.
    #[serde(default = "default_min_training_rows")]
    pub min_training_rows: usize,
    /// Base seed for bootstrap sampling. Tree `i` draws from `seed + i`.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            tree_count: default_tree_count(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            min_training_rows: default_min_training_rows(),
            seed: default_seed(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Feature derivation settings.
    #[serde(default)]
    pub features: FeatureConfig,
    /// Forecast model settings.
    #[serde(default)]
    pub forest: ForestConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file, filling omitted fields with
    /// defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.features.rolling_window == 0 {
            return Err(EngineError::invalid_input("rolling_window must be >= 1"));
        }
        if self.features.lags.is_empty() {
            return Err(EngineError::invalid_input(
                "at least one lag offset is required",
            ));
        }
        if self.features.lags.iter().any(|&lag| lag == 0) {
            return Err(EngineError::invalid_input("lag offsets must be >= 1"));
        }
        if self.features.min_rows == 0 {
            return Err(EngineError::invalid_input("min_rows must be >= 1"));
        }
        if self.forest.tree_count == 0 {
            return Err(EngineError::invalid_input("tree_count must be >= 1"));
        }
        if self.forest.min_samples_leaf == 0 {
            return Err(EngineError::invalid_input("min_samples_leaf must be >= 1"));
        }
        if self.forest.min_training_rows == 0 {
            return Err(EngineError::invalid_input("min_training_rows must be >= 1"));
        }
        Ok(())
    }
}
