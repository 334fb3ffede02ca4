//! Efficient frontier construction.
//!
//! The frontier is swept by return level: for each level `r` between the
//! minimum-variance return and the maximum attainable return, solve
//!
//! ```text
//! minimize    w' Sigma w
//! subject to  sum(w) == 1, lb <= w <= ub, G w <= h, mu' w == r
//! ```
//!
//! The two endpoints come from [`FrontierLimits`], which are solved once.

use nalgebra::DVector;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::evaluate::{evaluate_portfolio, RiskReturn};
use crate::error::{FrontierError, Result};
use crate::model::{Constraints, MomentEstimate, Portfolio};
use crate::problem::Problem;
use crate::solver::Settings;

/// Relative return tolerance; levels closer than this are the same level.
const RETURN_REL_TOL: f64 = 1e-9;

/// Slack on `Sigma w`, relative to the largest covariance entry, when
/// searching the set of minimum-variance portfolios.
const MIN_RISK_REL_TOL: f64 = 1e-7;

/// A portfolio together with its evaluated risk and return.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierPoint {
    pub portfolio: Portfolio,
    pub risk: f64,
    pub expected_return: f64,
}

impl FrontierPoint {
    /// Evaluate `portfolio` and bundle it with its moments.
    pub fn evaluate(moments: &MomentEstimate, portfolio: Portfolio) -> Result<Self> {
        let RiskReturn {
            risk,
            expected_return,
        } = evaluate_portfolio(moments, &portfolio)?;
        Ok(FrontierPoint {
            portfolio,
            risk,
            expected_return,
        })
    }

    pub fn risk_return(&self) -> RiskReturn {
        RiskReturn {
            risk: self.risk,
            expected_return: self.expected_return,
        }
    }
}

/// The two ends of the continuous frontier.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierLimits {
    /// Global minimum-variance portfolio.
    pub min_risk: FrontierPoint,
    /// Lowest-variance portfolio among those with maximal return.
    pub max_return: FrontierPoint,
}

impl FrontierLimits {
    /// Return range `[min, max]` spanned by the frontier.
    pub fn return_range(&self) -> (f64, f64) {
        (self.min_risk.expected_return, self.max_return.expected_return)
    }

    /// Risk range `[min, max]` spanned by the frontier.
    pub fn risk_range(&self) -> (f64, f64) {
        (self.min_risk.risk, self.max_return.risk)
    }
}

/// Discretized efficient frontier ordered by increasing risk.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierSet {
    points: Vec<FrontierPoint>,
}

/// One `(risk, return)` vertex of the frontier line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinePoint {
    pub risk: f64,
    #[serde(rename = "return")]
    pub expected_return: f64,
}

impl FrontierSet {
    pub fn points(&self) -> &[FrontierPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&FrontierPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&FrontierPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrontierPoint> {
        self.points.iter()
    }

    pub fn portfolios(&self) -> impl Iterator<Item = &Portfolio> {
        self.points.iter().map(|p| &p.portfolio)
    }

    /// Ordered `(risk, return)` sequence for line plots.
    pub fn line(&self) -> Vec<LinePoint> {
        self.points
            .iter()
            .map(|p| LinePoint {
                risk: p.risk,
                expected_return: p.expected_return,
            })
            .collect()
    }
}

/// Builds efficient frontiers for one moment estimate and constraint set.
#[derive(Debug, Clone)]
pub struct FrontierBuilder<'a> {
    moments: &'a MomentEstimate,
    constraints: &'a Constraints,
    settings: Settings,
}

impl<'a> FrontierBuilder<'a> {
    pub fn new(moments: &'a MomentEstimate, constraints: &'a Constraints) -> Result<Self> {
        if constraints.num_assets() != moments.num_assets() {
            return Err(FrontierError::DimensionMismatch {
                expected: moments.num_assets(),
                got: constraints.num_assets(),
            });
        }
        Ok(FrontierBuilder {
            moments,
            constraints,
            settings: Settings::default(),
        })
    }

    /// Use custom solver settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn moments(&self) -> &'a MomentEstimate {
        self.moments
    }

    pub fn constraints(&self) -> &'a Constraints {
        self.constraints
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Absolute tolerance for comparing return levels.
    pub fn return_tolerance(&self) -> f64 {
        RETURN_REL_TOL * self.moments.mean().amax().max(1.0)
    }

    /// Solve for the minimum-variance and maximum-return portfolios.
    ///
    /// Both ends break ties toward the frontier: among minimum-variance
    /// portfolios the highest-return one is kept, and among maximum-return
    /// portfolios the lowest-variance one.
    pub fn limits(&self) -> Result<FrontierLimits> {
        let min_w = self.min_variance_weights()?;
        let min_risk = FrontierPoint::evaluate(self.moments, Portfolio::new(min_w))?;

        // Stage 1: highest attainable return. Stage 2: least variance at that return.
        let lp_w = Problem::maximize_return(self.moments, self.constraints)
            .build()
            .solve_weights(&self.settings)?;
        let r_max = self.moments.mean().dot(&lp_w);
        let max_w = self.least_variance_above(r_max - self.return_tolerance(), lp_w)?;
        let mut max_return = FrontierPoint::evaluate(self.moments, Portfolio::new(max_w))?;

        // The LP endpoint can never sit below the minimum-variance return.
        if max_return.expected_return < min_risk.expected_return {
            max_return = min_risk.clone();
        }

        debug!(
            min_risk = min_risk.risk,
            min_return = min_risk.expected_return,
            max_risk = max_return.risk,
            max_return = max_return.expected_return,
            "frontier limits"
        );
        Ok(FrontierLimits {
            min_risk,
            max_return,
        })
    }

    /// Highest-return portfolio among those of minimum variance.
    ///
    /// A singular covariance (perfectly correlated assets, or fewer periods
    /// than assets) leaves a whole face of minimizers. Every minimizer `w`
    /// of `w' Sigma w` has the same `Sigma w`, so the face is cut out by
    /// `|Sigma (w - w*)| <= eps` around the first solution `w*`.
    fn min_variance_weights(&self) -> Result<DVector<f64>> {
        let w_star = Problem::minimize_variance(self.moments, self.constraints)
            .build()
            .solve_weights(&self.settings)?;
        let mean = self.moments.mean();
        let r_star = mean.dot(&w_star);

        let cov = self.moments.covariance();
        let eps = MIN_RISK_REL_TOL * cov.amax();
        let mut minimizers = self.constraints.clone();
        for i in 0..cov.nrows() {
            let row: DVector<f64> = cov.row(i).transpose();
            let center = row.dot(&w_star);
            minimizers = minimizers
                .with_inequality(row.clone(), center + eps)?
                .with_inequality(-row, eps - center)?;
        }

        let lp_w = match Problem::maximize_return(self.moments, &minimizers)
            .build()
            .solve_weights(&self.settings)
        {
            Ok(w) => w,
            Err(e) if is_recoverable(&e) => {
                debug!(error = %e, "minimizer search failed, keeping first solution");
                return Ok(w_star);
            }
            Err(e) => return Err(e),
        };

        let tol = self.return_tolerance();
        let r_tie = mean.dot(&lp_w);
        if r_tie <= r_star + tol {
            return Ok(w_star);
        }
        debug!(r_star, r_tie, "minimum variance is not unique, taking the highest return");
        self.least_variance_above(r_tie - tol, lp_w)
    }

    /// Least-variance portfolio with return at least `floor`.
    ///
    /// `fallback` already attains the floor and is kept if the solve fails.
    /// Near the maximum return the feasible set is very thin.
    fn least_variance_above(&self, floor: f64, fallback: DVector<f64>) -> Result<DVector<f64>> {
        match Problem::minimize_variance(self.moments, self.constraints)
            .min_return(floor)
            .build()
            .solve_weights(&self.settings)
        {
            Ok(w) => Ok(w),
            Err(e) if is_recoverable(&e) => {
                debug!(error = %e, floor, "tie-break stage failed, keeping LP solution");
                Ok(fallback)
            }
            Err(e) => Err(e),
        }
    }

    /// Build a frontier of `k` portfolios.
    ///
    /// `k == 1` yields only the minimum-variance portfolio. When the return
    /// range collapses to a single level, one portfolio is returned whatever
    /// `k` is.
    pub fn build(&self, k: usize) -> Result<FrontierSet> {
        if k == 0 {
            return Err(FrontierError::InvalidParameter(
                "number of frontier portfolios must be at least 1".into(),
            ));
        }
        let limits = self.limits()?;
        self.build_with_limits(k, &limits)
    }

    /// Build a frontier of `k` portfolios between already solved limits.
    pub fn build_with_limits(&self, k: usize, limits: &FrontierLimits) -> Result<FrontierSet> {
        if k == 0 {
            return Err(FrontierError::InvalidParameter(
                "number of frontier portfolios must be at least 1".into(),
            ));
        }

        let (r_min, r_max) = limits.return_range();
        if k == 1 || r_max - r_min <= self.return_tolerance() {
            info!(requested = k, "frontier collapses to the minimum-variance portfolio");
            return Ok(FrontierSet {
                points: vec![limits.min_risk.clone()],
            });
        }

        info!(k, r_min, r_max, "building efficient frontier");
        let step = (r_max - r_min) / (k - 1) as f64;
        let mut points = Vec::with_capacity(k);
        points.push(limits.min_risk.clone());
        for i in 1..k - 1 {
            let level = r_min + step * i as f64;
            points.push(self.point_at_return(level, limits)?);
        }
        points.push(limits.max_return.clone());

        Ok(FrontierSet { points })
    }

    /// Minimum-variance portfolio at return `level`, which must lie within
    /// the limits' return range.
    ///
    /// Levels at either end reuse the limit portfolios. If the solver reports
    /// an interior level as infeasible (possible only through rounding), the
    /// nearer limit is used instead.
    pub fn point_at_return(&self, level: f64, limits: &FrontierLimits) -> Result<FrontierPoint> {
        let (r_min, r_max) = limits.return_range();
        let tol = self.return_tolerance();
        if level <= r_min + tol {
            return Ok(limits.min_risk.clone());
        }
        if level >= r_max - tol {
            return Ok(limits.max_return.clone());
        }

        match Problem::minimize_variance(self.moments, self.constraints)
            .target_return(level)
            .build()
            .solve_weights(&self.settings)
        {
            Ok(w) => {
                let point = FrontierPoint::evaluate(self.moments, Portfolio::new(w))?;
                debug!(level, risk = point.risk, "solved frontier level");
                Ok(point)
            }
            Err(FrontierError::InfeasibleConstraint(msg)) => {
                warn!(level, %msg, "return level infeasible, clamping to nearest limit");
                if level - r_min < r_max - level {
                    Ok(limits.min_risk.clone())
                } else {
                    Ok(limits.max_return.clone())
                }
            }
            Err(e) => Err(e),
        }
    }
}

/// Failures of the thin tie-break problems that leave a usable fallback.
fn is_recoverable(e: &FrontierError) -> bool {
    matches!(
        e,
        FrontierError::InfeasibleConstraint(_)
            | FrontierError::NumericalError(_)
            | FrontierError::Convergence { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};

    fn diagonal_moments() -> MomentEstimate {
        MomentEstimate::from_parts(
            DVector::from_vec(vec![0.01, 0.02, 0.015]),
            DMatrix::from_diagonal(&DVector::from_vec(vec![0.04, 0.09, 0.0625])),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_points_rejected() {
        let m = diagonal_moments();
        let c = Constraints::long_only(3);
        let err = FrontierBuilder::new(&m, &c).unwrap().build(0).unwrap_err();
        assert!(matches!(err, FrontierError::InvalidParameter(_)));
    }

    #[test]
    fn test_single_point_is_min_variance() {
        let m = diagonal_moments();
        let c = Constraints::long_only(3);
        let builder = FrontierBuilder::new(&m, &c).unwrap();
        let frontier = builder.build(1).unwrap();
        let limits = builder.limits().unwrap();
        assert_eq!(frontier.len(), 1);
        assert!((frontier.points()[0].risk - limits.min_risk.risk).abs() < 1e-9);
    }

    #[test]
    fn test_max_return_is_single_asset() {
        let m = diagonal_moments();
        let c = Constraints::long_only(3);
        let limits = FrontierBuilder::new(&m, &c).unwrap().limits().unwrap();
        let w = limits.max_return.portfolio.weights();
        assert!((w[1] - 1.0).abs() < 1e-5, "got {}", w);
        assert!((limits.max_return.risk - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_equal_means_collapse() {
        let m = MomentEstimate::from_parts(
            DVector::from_vec(vec![0.01, 0.01]),
            DMatrix::from_diagonal(&DVector::from_vec(vec![0.04, 0.09])),
        )
        .unwrap();
        let c = Constraints::long_only(2);
        let frontier = FrontierBuilder::new(&m, &c).unwrap().build(10).unwrap();
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_builder_dimension_check() {
        let m = diagonal_moments();
        let c = Constraints::long_only(4);
        assert!(FrontierBuilder::new(&m, &c).is_err());
    }
}
