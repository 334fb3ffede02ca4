//! Property-based tests for moment estimation and portfolio evaluation.
//!
//! These tests verify that:
//! 1. Estimated covariances are symmetric with non-negative variances
//! 2. Estimated means stay inside each asset's observed range
//! 3. Evaluated risk is never negative for any normalized weights
//! 4. Frontier portfolios respect the budget and bounds

use nalgebra::DMatrix;
use proptest::prelude::*;

use efficient_frontier::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Strategy for a `periods x assets` return table with bounded entries.
fn returns_strategy() -> impl Strategy<Value = DMatrix<f64>> {
    (2usize..12, 1usize..5).prop_flat_map(|(periods, assets)| {
        prop::collection::vec(-0.2..0.2f64, periods * assets)
            .prop_map(move |values| DMatrix::from_row_slice(periods, assets, &values))
    })
}

/// Strategy for a return table together with normalized long-only weights.
fn returns_and_weights_strategy() -> impl Strategy<Value = (DMatrix<f64>, Vec<f64>)> {
    returns_strategy().prop_flat_map(|returns| {
        let n = returns.ncols();
        (
            Just(returns),
            prop::collection::vec(0.01..1.0f64, n).prop_map(|raw| {
                let total: f64 = raw.iter().sum();
                raw.into_iter().map(|w| w / total).collect()
            }),
        )
    })
}

// ============================================================================
// Moment Estimation Properties
// ============================================================================

proptest! {
    #[test]
    fn covariance_is_symmetric_with_nonnegative_diagonal(returns in returns_strategy()) {
        let sample = ReturnSample::new(returns).unwrap();
        let moments = MomentEstimate::from_sample(&sample).unwrap();
        let cov = moments.covariance();

        for i in 0..cov.nrows() {
            prop_assert!(cov[(i, i)] >= 0.0);
            for j in 0..cov.ncols() {
                prop_assert_eq!(cov[(i, j)], cov[(j, i)]);
            }
        }
    }

    #[test]
    fn mean_lies_within_observed_range(returns in returns_strategy()) {
        let sample = ReturnSample::new(returns.clone()).unwrap();
        let moments = MomentEstimate::from_sample(&sample).unwrap();

        for (j, column) in returns.column_iter().enumerate() {
            let lo = column.min();
            let hi = column.max();
            let mean = moments.mean()[j];
            prop_assert!(mean >= lo - 1e-12 && mean <= hi + 1e-12,
                "mean {} outside [{}, {}]", mean, lo, hi);
        }
    }

    #[test]
    fn single_period_is_rejected(values in prop::collection::vec(-0.2..0.2f64, 1..5)) {
        let n = values.len();
        let sample = ReturnSample::new(DMatrix::from_row_slice(1, n, &values)).unwrap();
        let is_insufficient = matches!(
            MomentEstimate::from_sample(&sample),
            Err(FrontierError::InsufficientData { .. })
        );
        prop_assert!(is_insufficient);
    }
}

// ============================================================================
// Evaluation Properties
// ============================================================================

proptest! {
    #[test]
    fn evaluated_risk_is_nonnegative((returns, weights) in returns_and_weights_strategy()) {
        let sample = ReturnSample::new(returns).unwrap();
        let moments = MomentEstimate::from_sample(&sample).unwrap();
        let portfolio = Portfolio::from_vec(weights);

        let rr = evaluate_portfolio(&moments, &portfolio).unwrap();
        prop_assert!(rr.risk >= 0.0);
        prop_assert!(rr.risk.is_finite());
        prop_assert!(rr.expected_return.is_finite());
    }

    #[test]
    fn expected_return_is_weighted_mean((returns, weights) in returns_and_weights_strategy()) {
        let sample = ReturnSample::new(returns).unwrap();
        let moments = MomentEstimate::from_sample(&sample).unwrap();

        let expected: f64 = weights
            .iter()
            .zip(moments.mean().iter())
            .map(|(w, m)| w * m)
            .sum();
        let rr = evaluate_portfolio(&moments, &Portfolio::from_vec(weights)).unwrap();
        prop_assert!((rr.expected_return - expected).abs() < 1e-12);
    }

    #[test]
    fn wrong_weight_length_is_rejected((returns, weights) in returns_and_weights_strategy()) {
        let sample = ReturnSample::new(returns).unwrap();
        let moments = MomentEstimate::from_sample(&sample).unwrap();

        let mut longer = weights;
        longer.push(0.0);
        let is_mismatch = matches!(
            evaluate_portfolio(&moments, &Portfolio::from_vec(longer)),
            Err(FrontierError::DimensionMismatch { .. })
        );
        prop_assert!(is_mismatch);
    }
}

// ============================================================================
// Frontier Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn frontier_portfolios_are_feasible(
        vols in prop::collection::vec(0.05..0.4f64, 2..5),
        means in prop::collection::vec(-0.01..0.03f64, 4),
        k in 1usize..6,
    ) {
        let n = vols.len();
        let mean = nalgebra::DVector::from_iterator(n, means.into_iter().take(n));
        let cov = DMatrix::from_diagonal(&nalgebra::DVector::from_iterator(
            n,
            vols.iter().map(|v| v * v),
        ));
        let moments = MomentEstimate::from_parts(mean, cov).unwrap();
        let constraints = Constraints::long_only(n);

        let frontier = FrontierBuilder::new(&moments, &constraints)
            .unwrap()
            .build(k)
            .unwrap();
        prop_assert!(frontier.len() <= k);
        for point in frontier.iter() {
            prop_assert!(constraints.is_satisfied_by(point.portfolio.weights(), 1e-6));
        }
    }
}
