//! Frontier construction and target matching tests.
//!
//! Pattern: define test cases as data, then run them programmatically.

use efficient_frontier::prelude::*;
use nalgebra::{DMatrix, DVector};

/// Tolerance for comparing floating point results
const TOL: f64 = 1e-6;

/// Ordering slack for solver noise between neighbouring frontier points
const ORDER_TOL: f64 = 1e-7;

/// 3 uncorrelated assets.
fn diagonal_moments() -> MomentEstimate {
    MomentEstimate::from_parts(
        DVector::from_vec(vec![0.01, 0.02, 0.015]),
        DMatrix::from_diagonal(&DVector::from_vec(vec![0.04, 0.09, 0.0625])),
    )
    .unwrap()
}

/// 4 correlated assets with a negatively correlated hedge.
fn correlated_moments() -> MomentEstimate {
    #[rustfmt::skip]
    let sigma = DMatrix::from_row_slice(4, 4, &[
         0.04,  0.01,  0.00, -0.01,
         0.01,  0.03,  0.00,  0.00,
         0.00,  0.00,  0.02,  0.00,
        -0.01,  0.00,  0.00,  0.01,
    ]);
    let mu = DVector::from_vec(vec![0.12, 0.10, 0.07, 0.05]);
    MomentEstimate::from_parts(mu, sigma).unwrap()
}

/// Every long-only portfolio on a simplex grid with the given step.
fn simplex_grid(n: usize, steps: usize) -> Vec<DVector<f64>> {
    fn fill(
        n: usize,
        left: usize,
        steps: usize,
        prefix: &mut Vec<usize>,
        out: &mut Vec<DVector<f64>>,
    ) {
        if prefix.len() == n - 1 {
            let mut w: Vec<f64> = prefix.iter().map(|&k| k as f64 / steps as f64).collect();
            w.push(left as f64 / steps as f64);
            out.push(DVector::from_vec(w));
            return;
        }
        for k in 0..=left {
            prefix.push(k);
            fill(n, left - k, steps, prefix, out);
            prefix.pop();
        }
    }
    let mut out = Vec::new();
    fill(n, steps, steps, &mut Vec::new(), &mut out);
    out
}

// ============================================================================
// Frontier construction
// ============================================================================

#[test]
fn test_two_point_frontier_example() {
    let m = diagonal_moments();
    let c = Constraints::long_only(3);
    let frontier = FrontierBuilder::new(&m, &c).unwrap().build(2).unwrap();

    assert_eq!(frontier.len(), 2);

    // Minimum variance: weights proportional to 1/sigma^2, heaviest in asset 1.
    let first = frontier.first().unwrap();
    let w = first.portfolio.weights();
    assert!(w[0] > w[1] && w[0] > w[2], "weights {}", w);
    assert!(first.risk <= 0.2);
    let total_precision: f64 = 1.0 / 0.04 + 1.0 / 0.09 + 1.0 / 0.0625;
    assert!((first.risk - (1.0 / total_precision).sqrt()).abs() < TOL);

    // Maximum return: all in asset 2.
    let last = frontier.last().unwrap();
    let w = last.portfolio.weights();
    assert!((w[1] - 1.0).abs() < 1e-5, "weights {}", w);
    assert!((last.risk - 0.3).abs() < 1e-5);
    assert!((last.expected_return - 0.02).abs() < TOL);
}

#[test]
fn test_frontier_ordering_properties() {
    for (name, m, k) in [
        ("diagonal", diagonal_moments(), 12),
        ("correlated", correlated_moments(), 15),
    ] {
        let c = Constraints::long_only(m.num_assets());
        let frontier = FrontierBuilder::new(&m, &c).unwrap().build(k).unwrap();
        assert_eq!(frontier.len(), k, "{}", name);

        let points = frontier.points();
        for pair in points.windows(2) {
            assert!(
                pair[1].risk >= pair[0].risk - ORDER_TOL,
                "{}: risk decreased {} -> {}",
                name,
                pair[0].risk,
                pair[1].risk
            );
            assert!(
                pair[1].expected_return >= pair[0].expected_return - ORDER_TOL,
                "{}: return decreased",
                name
            );
        }

        let first_risk = points[0].risk;
        assert!(
            points.iter().all(|p| p.risk >= first_risk - ORDER_TOL),
            "{}: first point is not the minimum-risk portfolio",
            name
        );

        for p in points {
            assert!(
                c.is_satisfied_by(p.portfolio.weights(), 1e-6),
                "{}: infeasible weights",
                name
            );
        }
    }
}

#[test]
fn test_evaluator_reproduces_frontier_points() {
    let m = correlated_moments();
    let c = Constraints::long_only(4);
    let frontier = FrontierBuilder::new(&m, &c).unwrap().build(8).unwrap();

    let evaluated = evaluate_all(&m, frontier.portfolios()).unwrap();
    for (point, rr) in frontier.iter().zip(&evaluated) {
        assert_eq!(point.risk, rr.risk);
        assert_eq!(point.expected_return, rr.expected_return);
    }
    assert_eq!(frontier.line().len(), 8);
}

#[test]
fn test_frontier_levels_are_evenly_spaced() {
    let m = correlated_moments();
    let c = Constraints::long_only(4);
    let frontier = FrontierBuilder::new(&m, &c).unwrap().build(5).unwrap();
    let returns: Vec<f64> = frontier.iter().map(|p| p.expected_return).collect();
    let step = (returns[4] - returns[0]) / 4.0;
    for (i, r) in returns.iter().enumerate() {
        assert!((r - (returns[0] + step * i as f64)).abs() < TOL, "level {}: {}", i, r);
    }
}

#[test]
fn test_frontier_respects_upper_bounds() {
    let m = correlated_moments();
    let cap = DVector::from_element(4, 0.4);
    let c = Constraints::with_bounds(DVector::zeros(4), cap).unwrap();
    let builder = FrontierBuilder::new(&m, &c).unwrap();
    let limits = builder.limits().unwrap();

    // Best capped portfolio: 40% A, 40% B, 20% C.
    let capped = 0.4 * 0.12 + 0.4 * 0.10 + 0.2 * 0.07;
    assert!((limits.max_return.expected_return - capped).abs() < TOL);

    let frontier = builder.build(6).unwrap();
    for p in frontier.iter() {
        assert!(p.portfolio.weights().iter().all(|w| *w <= 0.4 + 1e-6));
    }
}

#[test]
fn test_linear_inequality_is_enforced() {
    // At most 30% in the first two assets combined.
    let m = correlated_moments();
    let c = Constraints::long_only(4)
        .with_inequality(DVector::from_vec(vec![1.0, 1.0, 0.0, 0.0]), 0.3)
        .unwrap();
    let frontier = FrontierBuilder::new(&m, &c).unwrap().build(5).unwrap();
    for p in frontier.iter() {
        let w = p.portfolio.weights();
        assert!(w[0] + w[1] <= 0.3 + 1e-6, "weights {}", w);
    }
}

#[test]
fn test_solver_iteration_cap_is_convergence_error() {
    let m = correlated_moments();
    let c = Constraints::long_only(4);
    let builder = FrontierBuilder::new(&m, &c).unwrap().with_settings(Settings {
        max_iter: 1,
        ..Settings::default()
    });

    let cases = [
        ("limits", builder.limits().map(|_| ())),
        ("build", builder.build(5).map(|_| ())),
    ];
    for (name, result) in cases {
        assert!(
            matches!(result, Err(FrontierError::Convergence { .. })),
            "{}: expected Convergence, got {:?}",
            name,
            result
        );
    }
}

// ============================================================================
// Singular covariance: many minimum-variance portfolios
// ============================================================================

/// Assets 1 and 2 perfectly correlated with equal variance, asset 3
/// independent. Every split of the pair has the same variance.
fn perfectly_correlated_pair() -> MomentEstimate {
    #[rustfmt::skip]
    let sigma = DMatrix::from_row_slice(3, 3, &[
        0.04, 0.04, 0.00,
        0.04, 0.04, 0.00,
        0.00, 0.00, 0.09,
    ]);
    MomentEstimate::from_parts(DVector::from_vec(vec![0.01, 0.012, 0.02]), sigma).unwrap()
}

/// Two periods of three assets: the covariance has rank 1 and a whole
/// segment of riskless portfolios `w = (a, 0.5, 0.5 - a)`.
fn short_sample_moments() -> MomentEstimate {
    let rows = vec![vec![0.01, 0.03, 0.02], vec![0.03, 0.01, 0.04]];
    MomentEstimate::from_sample(&ReturnSample::from_rows(&rows).unwrap()).unwrap()
}

#[test]
fn test_min_risk_prefers_higher_return_in_correlated_pair() {
    let m = perfectly_correlated_pair();
    let c = Constraints::long_only(3);
    let builder = FrontierBuilder::new(&m, &c).unwrap();
    let limits = builder.limits().unwrap();

    // Pair weight 0.09 / 0.13, all of it in the higher-return asset.
    let pair = 0.09 / 0.13;
    let min = &limits.min_risk;
    let w = min.portfolio.weights();
    assert!(w[0] < 1e-3, "weights {}", w);
    assert!((w[1] - pair).abs() < 1e-3, "weights {}", w);
    assert!((min.risk - (0.04 * 0.09 / 0.13f64).sqrt()).abs() < TOL);
    assert!((min.expected_return - (0.012 * pair + 0.02 * (1.0 - pair))).abs() < TOL);

    // No two frontier points share the minimum risk.
    let frontier = builder.build(20).unwrap();
    let points = frontier.points();
    assert!(points[1].risk > points[0].risk + 1e-6);

    let matcher = TargetMatcher::with_limits(builder, limits.clone());
    let hit = matcher.by_risk(limits.min_risk.risk).unwrap();
    assert!(hit.warning.is_none());
    assert!(hit.point.expected_return >= min.expected_return - TOL);
}

#[test]
fn test_min_risk_prefers_higher_return_with_short_sample() {
    let m = short_sample_moments();
    let c = Constraints::long_only(3);
    let matcher = TargetMatcher::new(FrontierBuilder::new(&m, &c).unwrap()).unwrap();
    let min = &matcher.limits().min_risk;

    // Best riskless portfolio: half in asset 2, half in asset 3.
    assert!(min.risk < 1e-4, "risk {}", min.risk);
    assert!((min.expected_return - 0.025).abs() < 1e-4, "return {}", min.expected_return);
    let w = min.portfolio.weights();
    assert!(w[0] < 1e-3 && (w[2] - 0.5).abs() < 1e-3, "weights {}", w);

    let hit = matcher.by_risk(min.risk).unwrap();
    assert!(hit.point.expected_return >= 0.025 - 1e-4);

    // Nothing on a grid with no more risk does better.
    for w in simplex_grid(3, 20) {
        let g = evaluate(&m, &w).unwrap();
        if g.risk <= min.risk {
            assert!(g.expected_return <= min.expected_return + 1e-4, "grid {}", w);
        }
    }
}

// ============================================================================
// Target matching
// ============================================================================

struct ReturnCase {
    name: &'static str,
    /// Position of the target inside the return range, 0 = min, 1 = max
    fraction: f64,
}

fn return_cases() -> Vec<ReturnCase> {
    vec![
        ReturnCase { name: "min_end", fraction: 0.0 },
        ReturnCase { name: "quarter", fraction: 0.25 },
        ReturnCase { name: "off_grid", fraction: 0.3719 },
        ReturnCase { name: "three_quarters", fraction: 0.75 },
        ReturnCase { name: "max_end", fraction: 1.0 },
    ]
}

#[test]
fn test_by_return_hits_target() {
    let m = correlated_moments();
    let c = Constraints::long_only(4);
    let matcher = TargetMatcher::new(FrontierBuilder::new(&m, &c).unwrap()).unwrap();
    let (r_min, r_max) = matcher.limits().return_range();

    for case in return_cases() {
        let target = r_min + case.fraction * (r_max - r_min);
        let result = matcher.by_return(target).unwrap();
        assert!(result.warning.is_none(), "case '{}' warned", case.name);

        let rr = evaluate_portfolio(&m, &result.point.portfolio).unwrap();
        assert!(
            (rr.expected_return - target).abs() < TOL,
            "case '{}': expected {}, got {}",
            case.name,
            target,
            rr.expected_return
        );
    }
}

#[test]
fn test_by_return_is_minimum_risk() {
    // No grid portfolio reaching the target return has lower risk.
    let m = correlated_moments();
    let c = Constraints::long_only(4);
    let matcher = TargetMatcher::new(FrontierBuilder::new(&m, &c).unwrap()).unwrap();
    let (r_min, r_max) = matcher.limits().return_range();
    let target = r_min + 0.5 * (r_max - r_min);
    let hit = matcher.by_return(target).unwrap();

    for w in simplex_grid(4, 20) {
        let rr = evaluate(&m, &w).unwrap();
        if rr.expected_return >= target {
            assert!(rr.risk >= hit.point.risk - 1e-6, "grid {} beats match", w);
        }
    }
}

#[test]
fn test_by_return_below_range() {
    let m = diagonal_moments();
    let c = Constraints::long_only(3);
    let matcher = TargetMatcher::new(FrontierBuilder::new(&m, &c).unwrap()).unwrap();

    let result = matcher.by_return(0.0).unwrap();
    assert_eq!(result.point, matcher.limits().min_risk);
    match result.warning {
        Some(RangeWarning::BelowRange { requested, minimum }) => {
            assert_eq!(requested, 0.0);
            assert!((minimum - matcher.limits().min_risk.expected_return).abs() < 1e-15);
        }
        other => panic!("expected BelowRange, got {:?}", other),
    }
}

#[test]
fn test_by_risk_is_optimal() {
    let m = correlated_moments();
    let c = Constraints::long_only(4);
    let matcher = TargetMatcher::new(FrontierBuilder::new(&m, &c).unwrap()).unwrap();
    let (s_min, s_max) = matcher.limits().risk_range();
    let grid = simplex_grid(4, 20);

    for fraction in [0.2, 0.5, 0.8] {
        let target = s_min + fraction * (s_max - s_min);
        let result = matcher.by_risk(target).unwrap();
        assert!(result.warning.is_none());
        assert!(result.iterations >= 1);

        let rr = evaluate_portfolio(&m, &result.point.portfolio).unwrap();
        assert!(
            rr.risk <= target + matcher.risk_tolerance() + 1e-9,
            "risk {} > {}",
            rr.risk,
            target
        );
        assert!((rr.risk - target).abs() <= matcher.risk_tolerance() + 1e-9);

        for w in &grid {
            let g = evaluate(&m, w).unwrap();
            if g.risk <= target {
                assert!(
                    g.expected_return <= rr.expected_return + 1e-5,
                    "grid {} returns {} at risk {}, match returns {}",
                    w,
                    g.expected_return,
                    g.risk,
                    rr.expected_return
                );
            }
        }
    }
}

#[test]
fn test_by_risk_out_of_range() {
    let m = diagonal_moments();
    let c = Constraints::long_only(3);
    let matcher = TargetMatcher::new(FrontierBuilder::new(&m, &c).unwrap()).unwrap();

    let low = matcher.by_risk(0.01).unwrap();
    assert!(matches!(low.warning, Some(RangeWarning::BelowRange { .. })));
    assert_eq!(low.point, matcher.limits().min_risk);

    let high = matcher.by_risk(0.5).unwrap();
    assert!(matches!(high.warning, Some(RangeWarning::AboveRange { .. })));
    assert_eq!(high.point, matcher.limits().max_return);
}

#[test]
fn test_batch_matching_keeps_order() {
    let m = diagonal_moments();
    let c = Constraints::long_only(3);
    let matcher = TargetMatcher::new(FrontierBuilder::new(&m, &c).unwrap()).unwrap();
    let results = matcher.by_returns(&[0.0, 0.016, 1.0]).unwrap();
    assert!(matches!(results[0].warning, Some(RangeWarning::BelowRange { .. })));
    assert!(results[1].warning.is_none());
    assert!(matches!(results[2].warning, Some(RangeWarning::AboveRange { .. })));
}

// ============================================================================
// Estimation feeding the frontier
// ============================================================================

#[test]
fn test_single_period_sample_is_insufficient() {
    let sample = ReturnSample::from_rows(&[vec![0.01, 0.02, 0.03]]).unwrap();
    assert!(matches!(
        MomentEstimate::from_sample(&sample),
        Err(FrontierError::InsufficientData { .. })
    ));
}

#[test]
fn test_frontier_from_estimated_moments() {
    let rows = vec![
        vec![0.02, 0.01, -0.01],
        vec![-0.01, 0.03, 0.02],
        vec![0.03, -0.02, 0.01],
        vec![0.01, 0.02, 0.00],
        vec![0.00, 0.01, 0.03],
        vec![0.02, 0.00, -0.02],
    ];
    let m = MomentEstimate::from_sample(&ReturnSample::from_rows(&rows).unwrap()).unwrap();
    let c = Constraints::long_only(3);
    let frontier = FrontierBuilder::new(&m, &c).unwrap().build(6).unwrap();
    assert!(!frontier.is_empty());
    for p in frontier.iter() {
        assert!(p.risk >= 0.0);
        assert!((p.portfolio.weights().sum() - 1.0).abs() < 1e-6);
    }
}
