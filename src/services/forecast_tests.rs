#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    use crate::config::{EngineConfig, FeatureConfig, ForestConfig};
    use crate::error::EngineError;
    use crate::models::{AqiReading, FeatureMatrix};
    use crate::services::features::build_features;
    use crate::services::forecast::{FittedModel, Forecaster, RegressionTree};

    fn create_matrix(values: &[i64], features: &FeatureConfig) -> FeatureMatrix {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let readings: Vec<AqiReading> = values
            .iter()
            .enumerate()
            .map(|(day, value)| {
                AqiReading::new("Madrid", base + Duration::days(day as i64), *value)
            })
            .collect();
        build_features(&readings, "Madrid", features).unwrap()
    }

    fn trend_values(days: usize) -> Vec<i64> {
        (0..days as i64).map(|day| 40 + 2 * day).collect()
    }

    fn varied_values(days: usize) -> Vec<i64> {
        (0..days as i64).map(|day| 40 + (day * 7) % 23).collect()
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let forecaster = Forecaster::new(EngineConfig::default());
        assert!(!forecaster.is_fitted());
        let err = forecaster.predict(3).unwrap_err();
        assert_eq!(err, EngineError::ModelNotFitted);
    }

    #[test]
    fn test_fit_requires_minimum_rows() {
        let features = FeatureConfig {
            rolling_window: 3,
            lags: vec![1],
            min_rows: 1,
        };
        let config = EngineConfig {
            features: features.clone(),
            ..EngineConfig::default()
        };
        let matrix = create_matrix(&[50, 52, 54, 56, 58, 60, 62, 64], &features);
        assert_eq!(matrix.len(), 7);

        let mut forecaster = Forecaster::new(config);
        let err = forecaster.fit(&matrix).unwrap_err();
        assert_eq!(err, EngineError::insufficient_data(10, 7));
        assert!(!forecaster.is_fitted());
    }

    #[test]
    fn test_fit_rejects_mismatched_lag_width() {
        // A matrix derived under one lag set cannot train a model configured
        // with another; the trees would split on features the inference rows
        // do not carry.
        let matrix = create_matrix(&varied_values(40), &FeatureConfig::default());

        let config = EngineConfig {
            features: FeatureConfig {
                lags: vec![1],
                ..FeatureConfig::default()
            },
            ..EngineConfig::default()
        };
        let mut forecaster = Forecaster::new(config);
        let err = forecaster.fit(&matrix).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert!(err.to_string().contains("lag values"));
        assert!(!forecaster.is_fitted());
    }

    #[test]
    fn test_constant_series_forecast_is_flat() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&[75; 30], &config.features);
        let mut forecaster = Forecaster::new(config);
        forecaster.fit(&matrix).unwrap();

        let result = forecaster.predict(5).unwrap();
        assert_eq!(result.len(), 5);
        for day in 0..5 {
            assert_eq!(result.point_estimates[day], 75.0);
            assert_eq!(result.lower_bound[day], 75.0);
            assert_eq!(result.upper_bound[day], 75.0);
        }
    }

    #[test]
    fn test_forecast_dates_follow_training_series() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&varied_values(30), &config.features);
        let model = FittedModel::train(&matrix, &config).unwrap();

        // 30 days from March 1 end on March 30.
        assert_eq!(
            model.last_training_date(),
            NaiveDate::from_ymd_opt(2024, 3, 30).unwrap()
        );
        let result = model.forecast(3).unwrap();
        assert_eq!(
            result.horizon_dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            ]
        );
    }

    #[test]
    fn test_trend_is_tracked_within_tolerance() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&trend_values(30), &config.features);
        let mut forecaster = Forecaster::new(config);
        let report = forecaster.fit(&matrix).unwrap();
        assert!(report.r_squared > 0.5);

        // The last training value is 98 and the trend adds 2 per day. Leaf
        // averaging keeps the forecast near the recent values, so allow a
        // generous band around the extrapolation.
        let result = forecaster.predict(3).unwrap();
        for (day, point) in result.point_estimates.iter().enumerate() {
            let extrapolated = 98.0 + 2.0 * (day + 1) as f64;
            assert!(
                (point - extrapolated).abs() <= 12.0,
                "day {day}: point {point} too far from trend {extrapolated}"
            );
        }
    }

    #[test]
    fn test_forecast_stays_within_training_range() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&trend_values(30), &config.features);
        let model = FittedModel::train(&matrix, &config).unwrap();

        let result = model.forecast(10).unwrap();
        for point in &result.point_estimates {
            assert!(*point >= 40.0 && *point <= 98.0);
        }
    }

    #[test]
    fn test_bounds_bracket_the_point_estimate() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&varied_values(35), &config.features);
        let model = FittedModel::train(&matrix, &config).unwrap();

        let result = model.forecast(7).unwrap();
        for day in 0..result.len() {
            let (lower, point, upper) = (
                result.lower_bound[day],
                result.point_estimates[day],
                result.upper_bound[day],
            );
            assert!(lower >= 0.0);
            assert!(lower <= point, "day {day}: {lower} > {point}");
            assert!(point <= upper, "day {day}: {point} > {upper}");
        }
    }

    #[test]
    fn test_large_ensemble_bounds_are_symmetric() {
        // Std-based bounds sit one sigma either side of the mean.
        let config = EngineConfig::default();
        let matrix = create_matrix(&varied_values(30), &config.features);
        let model = FittedModel::train(&matrix, &config).unwrap();

        let result = model.forecast(1).unwrap();
        let spread_up = result.upper_bound[0] - result.point_estimates[0];
        let spread_down = result.point_estimates[0] - result.lower_bound[0];
        assert!((spread_up - spread_down).abs() < 1e-9);
    }

    #[test]
    fn test_single_tree_bounds_collapse_to_the_estimate() {
        // Below ten trees the bounds are the per-tree min and max.
        let config = EngineConfig {
            forest: ForestConfig {
                tree_count: 1,
                ..ForestConfig::default()
            },
            ..EngineConfig::default()
        };
        let matrix = create_matrix(&varied_values(30), &config.features);
        let model = FittedModel::train(&matrix, &config).unwrap();

        let result = model.forecast(4).unwrap();
        assert_eq!(result.lower_bound, result.point_estimates);
        assert_eq!(result.upper_bound, result.point_estimates);
    }

    #[test]
    fn test_training_is_deterministic_for_a_seed() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&varied_values(32), &config.features);

        let first = FittedModel::train(&matrix, &config).unwrap();
        let second = FittedModel::train(&matrix, &config).unwrap();
        assert_eq!(first.forecast(5).unwrap(), second.forecast(5).unwrap());
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&varied_values(30), &config.features);
        let model = FittedModel::train(&matrix, &config).unwrap();
        let err = model.forecast(0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_training_report_diagnostics() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&trend_values(30), &config.features);
        let model = FittedModel::train(&matrix, &config).unwrap();

        let report = model.report();
        assert_eq!(report.rows_used, matrix.len());
        assert!(report.mse.is_finite() && report.mse >= 0.0);
        assert!(report.r_squared <= 1.0 + 1e-9);
        assert_eq!(model.tree_count(), 50);
    }

    #[test]
    fn test_json_round_trip_preserves_behavior() {
        let config = EngineConfig::default();
        let matrix = create_matrix(&varied_values(30), &config.features);
        let model = FittedModel::train(&matrix, &config).unwrap();

        let json = model.to_json().unwrap();
        let restored = FittedModel::from_json(&json).unwrap();
        assert_eq!(restored.tree_count(), model.tree_count());
        assert_eq!(restored.forecast(5).unwrap(), model.forecast(5).unwrap());
    }

    #[test]
    fn test_regression_tree_learns_a_step_function() {
        let vectors = vec![vec![0.0], vec![1.0], vec![8.0], vec![9.0]];
        let targets = vec![0.0, 0.0, 100.0, 100.0];
        let config = ForestConfig {
            tree_count: 1,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
            ..ForestConfig::default()
        };
        let tree = RegressionTree::grow(&vectors, &targets, &[0, 1, 2, 3], &config);

        assert_eq!(tree.predict(&[0.5]), 0.0);
        assert_eq!(tree.predict(&[8.5]), 100.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_forecasts_are_ordered_and_non_negative(
            values in prop::collection::vec(0i64..300, 25..35),
            horizon in 1usize..8,
        ) {
            let config = EngineConfig {
                forest: ForestConfig {
                    tree_count: 10,
                    max_depth: 4,
                    ..ForestConfig::default()
                },
                ..EngineConfig::default()
            };
            let matrix = create_matrix(&values, &config.features);
            let model = FittedModel::train(&matrix, &config).unwrap();
            let result = model.forecast(horizon).unwrap();

            prop_assert_eq!(result.len(), horizon);
            for day in 0..horizon {
                prop_assert!(result.lower_bound[day] >= 0.0);
                prop_assert!(result.lower_bound[day] <= result.point_estimates[day]);
                prop_assert!(result.point_estimates[day] <= result.upper_bound[day]);
                if day > 0 {
                    let gap = result.horizon_dates[day]
                        .signed_duration_since(result.horizon_dates[day - 1]);
                    prop_assert_eq!(gap.num_days(), 1);
                }
            }
        }
    }
}
