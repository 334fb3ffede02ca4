//! Weight constraints.

use nalgebra::DVector;

use crate::error::{FrontierError, Result};

/// Slack allowed when checking that the budget is reachable within the bounds.
const BUDGET_TOL: f64 = 1e-12;

/// A linear inequality `coeffs' w <= bound` on the weight vector.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInequality {
    pub coeffs: DVector<f64>,
    pub bound: f64,
}

/// Portfolio constraints: per-asset bounds, full investment (`sum(w) == 1`)
/// and optional extra linear inequalities.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    lower: DVector<f64>,
    upper: DVector<f64>,
    inequalities: Vec<LinearInequality>,
}

impl Constraints {
    /// Long-only, fully invested: `0 <= w_i <= 1`, `sum(w) == 1`.
    pub fn long_only(n: usize) -> Self {
        Constraints {
            lower: DVector::zeros(n),
            upper: DVector::from_element(n, 1.0),
            inequalities: Vec::new(),
        }
    }

    /// Fully invested with custom per-asset bounds.
    pub fn with_bounds(lower: DVector<f64>, upper: DVector<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(FrontierError::DimensionMismatch {
                expected: lower.len(),
                got: upper.len(),
            });
        }
        for (i, (lo, hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(FrontierError::InvalidParameter(format!(
                    "bounds for asset {} must be finite",
                    i
                )));
            }
            if lo > hi {
                return Err(FrontierError::InfeasibleConstraint(format!(
                    "lower bound {} exceeds upper bound {} for asset {}",
                    lo, hi, i
                )));
            }
        }

        let (lo_sum, hi_sum) = (lower.sum(), upper.sum());
        if lo_sum > 1.0 + BUDGET_TOL || hi_sum < 1.0 - BUDGET_TOL {
            return Err(FrontierError::InfeasibleConstraint(format!(
                "bounds admit total weight in [{}, {}], which excludes 1",
                lo_sum, hi_sum
            )));
        }

        Ok(Constraints {
            lower,
            upper,
            inequalities: Vec::new(),
        })
    }

    /// Add the inequality `coeffs' w <= bound`.
    pub fn with_inequality(mut self, coeffs: DVector<f64>, bound: f64) -> Result<Self> {
        if coeffs.len() != self.num_assets() {
            return Err(FrontierError::DimensionMismatch {
                expected: self.num_assets(),
                got: coeffs.len(),
            });
        }
        if !bound.is_finite() || coeffs.iter().any(|c| !c.is_finite()) {
            return Err(FrontierError::InvalidParameter(
                "linear inequality must be finite".into(),
            ));
        }
        self.inequalities.push(LinearInequality { coeffs, bound });
        Ok(self)
    }

    pub fn num_assets(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &DVector<f64> {
        &self.lower
    }

    pub fn upper(&self) -> &DVector<f64> {
        &self.upper
    }

    pub fn inequalities(&self) -> &[LinearInequality] {
        &self.inequalities
    }

    /// Check `w` against every constraint within `tol`.
    pub fn is_satisfied_by(&self, w: &DVector<f64>, tol: f64) -> bool {
        if w.len() != self.num_assets() {
            return false;
        }
        let in_bounds = w
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(wi, (lo, hi))| *wi >= lo - tol && *wi <= hi + tol);
        let budget = (w.sum() - 1.0).abs() <= tol;
        let linear = self
            .inequalities
            .iter()
            .all(|ineq| ineq.coeffs.dot(w) <= ineq.bound + tol);
        in_bounds && budget && linear
    }
}
