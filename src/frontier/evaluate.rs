//! Portfolio evaluation: weights to (risk, return).

use nalgebra::DVector;
use serde::Serialize;

use crate::error::{FrontierError, Result};
use crate::model::{MomentEstimate, Portfolio};

/// Risk (standard deviation) and expected return of a weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskReturn {
    pub risk: f64,
    #[serde(rename = "return")]
    pub expected_return: f64,
}

/// Evaluate `risk = sqrt(w' Sigma w)` and `return = mu' w`.
///
/// Only the length of `w` is checked; weights need not sum to one or be
/// non-negative, so single-asset and benchmark vectors evaluate as well.
pub fn evaluate(moments: &MomentEstimate, w: &DVector<f64>) -> Result<RiskReturn> {
    let n = moments.num_assets();
    if w.len() != n {
        return Err(FrontierError::DimensionMismatch {
            expected: n,
            got: w.len(),
        });
    }

    let variance = (moments.covariance() * w).dot(w);
    Ok(RiskReturn {
        // PSD rounding can leave a tiny negative variance.
        risk: variance.max(0.0).sqrt(),
        expected_return: moments.mean().dot(w),
    })
}

pub fn evaluate_portfolio(moments: &MomentEstimate, portfolio: &Portfolio) -> Result<RiskReturn> {
    evaluate(moments, portfolio.weights())
}

/// Evaluate several portfolios, failing on the first bad one.
pub fn evaluate_all<'p, I>(moments: &MomentEstimate, portfolios: I) -> Result<Vec<RiskReturn>>
where
    I: IntoIterator<Item = &'p Portfolio>,
{
    portfolios
        .into_iter()
        .map(|p| evaluate_portfolio(moments, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn moments() -> MomentEstimate {
        MomentEstimate::from_parts(
            DVector::from_vec(vec![0.10, 0.05]),
            DMatrix::from_row_slice(2, 2, &[0.04, 0.01, 0.01, 0.09]),
        )
        .unwrap()
    }

    #[test]
    fn test_single_asset() {
        let rr = evaluate_portfolio(&moments(), &Portfolio::single_asset(2, 1)).unwrap();
        assert_relative_eq!(rr.risk, 0.3, epsilon = 1e-12);
        assert_relative_eq!(rr.expected_return, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_mixed_weights() {
        // var = 0.25*0.04 + 2*0.25*0.01 + 0.25*0.09 = 0.0375
        let rr = evaluate_portfolio(&moments(), &Portfolio::equal_weight(2)).unwrap();
        assert_relative_eq!(rr.risk, 0.0375_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(rr.expected_return, 0.075, epsilon = 1e-12);
    }

    #[test]
    fn test_unconstrained_vectors_allowed() {
        let w = DVector::from_vec(vec![1.5, -0.5]);
        assert!(evaluate(&moments(), &w).is_ok());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = evaluate(&moments(), &DVector::from_vec(vec![1.0])).unwrap_err();
        assert!(matches!(
            err,
            FrontierError::DimensionMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn test_evaluate_all_preserves_order() {
        let ps = [Portfolio::single_asset(2, 0), Portfolio::single_asset(2, 1)];
        let out = evaluate_all(&moments(), &ps).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].expected_return > out[1].expected_return);
    }
}
