//! Ensemble regression forecasting.
//!
//! A seeded random forest of variance-reducing regression trees, trained on
//! the feature matrix and applied iteratively: each forecast day is predicted
//! from the tail of the reconstructed series, appended to it, and fed into
//! the next day's lag features. Uncertainty therefore grows with the horizon.
//!
//! Confidence bounds come from the spread of the individual trees. Ensembles
//! of ten or more trees report one standard deviation around the ensemble
//! mean; smaller ensembles fall back to the per-tree min and max.

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, FeatureConfig, ForestConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{FeatureMatrix, FeatureRow, ForecastResult, TrainingReport};
use crate::services::features::rolling_stats;

/// Smallest ensemble for which std-based bounds are meaningful.
const MIN_TREES_FOR_STD_BOUNDS: usize = 10;

/// Minimum error reduction a split must achieve to beat a leaf.
const MIN_SSE_IMPROVEMENT: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, vector: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if vector[*feature] <= *threshold {
                    left.predict(vector)
                } else {
                    right.predict(vector)
                }
            }
        }
    }
}

/// One regression tree grown on a bootstrap sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegressionTree {
    root: TreeNode,
}

impl RegressionTree {
    pub(crate) fn grow(
        vectors: &[Vec<f64>],
        targets: &[f64],
        sample: &[usize],
        config: &ForestConfig,
    ) -> Self {
        Self {
            root: grow_node(vectors, targets, sample, 0, config),
        }
    }

    pub(crate) fn predict(&self, vector: &[f64]) -> f64 {
        self.root.predict(vector)
    }
}

struct CandidateSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

fn mean_of(targets: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

fn sse_of(targets: &[f64], indices: &[usize], mean: f64) -> f64 {
    indices.iter().map(|&i| (targets[i] - mean).powi(2)).sum()
}

fn grow_node(
    vectors: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    depth: usize,
    config: &ForestConfig,
) -> TreeNode {
    let mean = mean_of(targets, indices);
    if depth >= config.max_depth || indices.len() < config.min_samples_split {
        return TreeNode::Leaf { value: mean };
    }
    let parent_sse = sse_of(targets, indices, mean);
    if parent_sse <= MIN_SSE_IMPROVEMENT {
        return TreeNode::Leaf { value: mean };
    }
    let split = match best_split(vectors, targets, indices, parent_sse, config) {
        Some(split) => split,
        None => return TreeNode::Leaf { value: mean },
    };

    let mut left = Vec::new();
    let mut right = Vec::new();
    for &index in indices {
        if vectors[index][split.feature] <= split.threshold {
            left.push(index);
        } else {
            right.push(index);
        }
    }

    TreeNode::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow_node(vectors, targets, &left, depth + 1, config)),
        right: Box::new(grow_node(vectors, targets, &right, depth + 1, config)),
    }
}

/// Exhaustive variance-reduction split search over every feature.
fn best_split(
    vectors: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    parent_sse: f64,
    config: &ForestConfig,
) -> Option<CandidateSplit> {
    let feature_count = vectors.first().map(|v| v.len()).unwrap_or(0);
    let n = indices.len();
    let mut best: Option<CandidateSplit> = None;

    for feature in 0..feature_count {
        let mut pairs: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (vectors[i][feature], targets[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
        let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();

        for position in 1..n {
            let (value, target) = pairs[position - 1];
            left_sum += target;
            left_sq += target * target;

            // Splitting between identical feature values is meaningless.
            if pairs[position].0 <= value {
                continue;
            }
            if position < config.min_samples_leaf || n - position < config.min_samples_leaf {
                continue;
            }

            let left_count = position as f64;
            let right_count = (n - position) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_count)
                + (right_sq - right_sum * right_sum / right_count);

            if sse < parent_sse - MIN_SSE_IMPROVEMENT
                && best.as_ref().map_or(true, |b| sse < b.sse)
            {
                best = Some(CandidateSplit {
                    feature,
                    threshold: (value + pairs[position].0) / 2.0,
                    sse,
                });
            }
        }
    }

    best
}

/// Immutable fitted snapshot: the ensemble plus the series tail needed to
/// seed lag and rolling features at inference time.
///
/// Serializable, so hosts can persist and restore fitted models; the engine
/// itself never touches storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    trees: Vec<RegressionTree>,
    features: FeatureConfig,
    last_date: NaiveDate,
    tail: Vec<f64>,
    report: TrainingReport,
}

impl FittedModel {
    /// Train an ensemble on a feature matrix.
    ///
    /// The matrix must come from the same feature configuration: rows whose
    /// lag count differs from `config.features.lags` fail with
    /// `InvalidInput`, since the trees would otherwise index features the
    /// inference rows do not have. Fails with `InsufficientData` when the
    /// matrix has fewer rows than `config.forest.min_training_rows`.
    /// Training is deterministic for a given matrix and seed.
    pub fn train(matrix: &FeatureMatrix, config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        if matrix.rows.len() != matrix.targets.len() {
            return Err(EngineError::invalid_input(
                "feature rows and targets are misaligned",
            ));
        }
        if matrix
            .rows
            .iter()
            .any(|row| row.lags.len() != config.features.lags.len())
        {
            return Err(EngineError::invalid_input(format!(
                "matrix rows must carry {} lag values to match the configured lag offsets",
                config.features.lags.len()
            )));
        }
        let n = matrix.rows.len();
        if n < config.forest.min_training_rows {
            return Err(EngineError::insufficient_data(
                config.forest.min_training_rows,
                n,
            ));
        }
        if matrix.series.is_empty() {
            return Err(EngineError::invalid_input("reconstructed series is empty"));
        }

        let vectors: Vec<Vec<f64>> = matrix.rows.iter().map(FeatureRow::to_vector).collect();
        let mut trees = Vec::with_capacity(config.forest.tree_count);
        for tree_index in 0..config.forest.tree_count {
            let mut rng = StdRng::seed_from_u64(
                config.forest.seed.wrapping_add(tree_index as u64),
            );
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(RegressionTree::grow(
                &vectors,
                &matrix.targets,
                &sample,
                &config.forest,
            ));
        }

        let predictions: Vec<f64> = vectors
            .iter()
            .map(|vector| ensemble_mean(&trees, vector))
            .collect();
        let mse = predictions
            .iter()
            .zip(&matrix.targets)
            .map(|(prediction, target)| (prediction - target).powi(2))
            .sum::<f64>()
            / n as f64;
        let target_mean = matrix.targets.iter().sum::<f64>() / n as f64;
        let ss_total: f64 = matrix
            .targets
            .iter()
            .map(|target| (target - target_mean).powi(2))
            .sum();
        let ss_residual = mse * n as f64;
        let r_squared = if ss_total > MIN_SSE_IMPROVEMENT {
            1.0 - ss_residual / ss_total
        } else if ss_residual <= MIN_SSE_IMPROVEMENT {
            1.0
        } else {
            0.0
        };
        let report = TrainingReport {
            rows_used: n,
            mse,
            r_squared,
        };

        let needed = config
            .features
            .max_lag()
            .max(config.features.rolling_window)
            .max(1);
        let tail_start = matrix.series.len().saturating_sub(needed);
        let last_offset = matrix.series.len() as i64 - 1;

        log::info!(
            "fitted {} trees on {n} rows (mse {:.2}, r2 {:.3})",
            trees.len(),
            report.mse,
            report.r_squared
        );

        Ok(Self {
            trees,
            features: config.features.clone(),
            last_date: matrix.series_start + Duration::days(last_offset),
            tail: matrix.series[tail_start..].to_vec(),
            report,
        })
    }

    /// Forecast the next `horizon` days after the last training day.
    ///
    /// Point estimates and bounds are clamped at zero; for every day
    /// `lower <= point <= upper` holds.
    pub fn forecast(&self, horizon: usize) -> EngineResult<ForecastResult> {
        if horizon == 0 {
            return Err(EngineError::invalid_input(
                "forecast horizon must be at least 1 day",
            ));
        }

        let mut working = self.tail.clone();
        let mut horizon_dates = Vec::with_capacity(horizon);
        let mut point_estimates = Vec::with_capacity(horizon);
        let mut lower_bound = Vec::with_capacity(horizon);
        let mut upper_bound = Vec::with_capacity(horizon);

        for step in 1..=horizon as i64 {
            let date = self.last_date + Duration::days(step);
            let vector = self.next_feature_row(date, &working).to_vector();
            let estimates = self.tree_estimates(&vector);
            let mean = estimates.iter().sum::<f64>() / estimates.len() as f64;
            let (lower, upper) = dispersion_bounds(&estimates, mean);
            let point = mean.max(0.0);

            horizon_dates.push(date);
            point_estimates.push(point);
            lower_bound.push(lower.max(0.0));
            upper_bound.push(upper.max(0.0));
            working.push(point);
        }

        Ok(ForecastResult {
            horizon_dates,
            point_estimates,
            lower_bound,
            upper_bound,
        })
    }

    /// Serialize the fitted snapshot to JSON for host-side persistence.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Restore a fitted snapshot previously produced by [`Self::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Number of trees in the ensemble.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// In-sample diagnostics recorded at fit time.
    pub fn report(&self) -> TrainingReport {
        self.report
    }

    /// Last day of the series the model was trained on.
    pub fn last_training_date(&self) -> NaiveDate {
        self.last_date
    }

    fn next_feature_row(&self, date: NaiveDate, working: &[f64]) -> FeatureRow {
        let lags = self
            .features
            .lags
            .iter()
            .map(|&lag| lag_value(working, lag))
            .collect();
        let (rolling_mean, rolling_std) =
            rolling_stats(working, working.len(), self.features.rolling_window);
        let day_of_week = date.weekday().num_days_from_monday();
        FeatureRow {
            date,
            lags,
            day_of_week,
            month: date.month(),
            is_weekend: day_of_week >= 5,
            rolling_mean,
            rolling_std,
        }
    }

    pub(crate) fn tree_estimates(&self, vector: &[f64]) -> Vec<f64> {
        self.trees.iter().map(|tree| tree.predict(vector)).collect()
    }
}

/// Value `lag` days back from the end of the working series. Lags reaching
/// past the start fall back to the oldest value.
fn lag_value(working: &[f64], lag: usize) -> f64 {
    match working.len().checked_sub(lag) {
        Some(index) => working[index],
        None => working[0],
    }
}

fn ensemble_mean(trees: &[RegressionTree], vector: &[f64]) -> f64 {
    trees.iter().map(|tree| tree.predict(vector)).sum::<f64>() / trees.len() as f64
}

fn dispersion_bounds(estimates: &[f64], mean: f64) -> (f64, f64) {
    if estimates.len() >= MIN_TREES_FOR_STD_BOUNDS {
        let variance = estimates
            .iter()
            .map(|estimate| (estimate - mean).powi(2))
            .sum::<f64>()
            / (estimates.len() - 1) as f64;
        let std = variance.sqrt();
        (mean - std, mean + std)
    } else {
        let mut lower = f64::INFINITY;
        let mut upper = f64::NEG_INFINITY;
        for &estimate in estimates {
            lower = lower.min(estimate);
            upper = upper.max(estimate);
        }
        (lower, upper)
    }
}

/// Stateful wrapper pairing a configuration with an optional fitted model.
///
/// `predict` before the first successful `fit` fails with `ModelNotFitted`;
/// a failed `fit` leaves any previous state untouched.
#[derive(Debug, Clone)]
pub struct Forecaster {
    config: EngineConfig,
    state: Option<FittedModel>,
}

impl Forecaster {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Train on a feature matrix, replacing any previous model on success.
    pub fn fit(&mut self, matrix: &FeatureMatrix) -> EngineResult<TrainingReport> {
        let model = FittedModel::train(matrix, &self.config)?;
        let report = model.report();
        self.state = Some(model);
        Ok(report)
    }

    /// Forecast with the fitted model.
    pub fn predict(&self, horizon: usize) -> EngineResult<ForecastResult> {
        match &self.state {
            Some(model) => model.forecast(horizon),
            None => Err(EngineError::ModelNotFitted),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// The fitted snapshot, if any.
    pub fn model(&self) -> Option<&FittedModel> {
        self.state.as_ref()
    }
}
