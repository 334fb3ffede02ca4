//! Return samples and moment estimation.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{FrontierError, Result};

/// Relative asymmetry tolerated in a supplied covariance matrix.
const SYMMETRY_TOL: f64 = 1e-9;

/// Per-period asset returns, one row per period and one column per asset.
#[derive(Debug, Clone)]
pub struct ReturnSample {
    returns: DMatrix<f64>,
}

impl ReturnSample {
    /// Wrap a `T x N` return matrix. All values must be finite.
    pub fn new(returns: DMatrix<f64>) -> Result<Self> {
        if returns.ncols() == 0 {
            return Err(FrontierError::InvalidParameter(
                "return sample has no assets".into(),
            ));
        }
        if let Some(pos) = returns.iter().position(|v| !v.is_finite()) {
            let (row, col) = (pos % returns.nrows(), pos / returns.nrows());
            return Err(FrontierError::InvalidParameter(format!(
                "non-finite return at period {}, asset {}",
                row, col
            )));
        }
        Ok(ReturnSample { returns })
    }

    /// Build a sample from per-period rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != n) {
            return Err(FrontierError::DimensionMismatch {
                expected: n,
                got: bad.len(),
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(DMatrix::from_row_slice(rows.len(), n, &flat))
    }

    /// Number of periods.
    pub fn periods(&self) -> usize {
        self.returns.nrows()
    }

    pub fn num_assets(&self) -> usize {
        self.returns.ncols()
    }

    pub fn returns(&self) -> &DMatrix<f64> {
        &self.returns
    }
}

/// Mean vector and covariance matrix of asset returns.
#[derive(Debug, Clone)]
pub struct MomentEstimate {
    mean: DVector<f64>,
    covariance: DMatrix<f64>,
}

impl MomentEstimate {
    /// Estimate arithmetic means and the sample covariance (divisor `T - 1`).
    ///
    /// Fails with [`FrontierError::InsufficientData`] for fewer than two periods.
    pub fn from_sample(sample: &ReturnSample) -> Result<Self> {
        let t = sample.periods();
        if t < 2 {
            return Err(FrontierError::InsufficientData { required: 2, got: t });
        }

        let x = sample.returns();
        let mean = x.row_mean().transpose();

        let mut centered = x.clone();
        for mut row in centered.row_iter_mut() {
            row -= mean.transpose();
        }
        let cov = centered.transpose() * &centered / (t as f64 - 1.0);
        let covariance = (&cov + cov.transpose()) * 0.5;

        debug!(periods = t, assets = sample.num_assets(), "estimated moments");
        Ok(MomentEstimate { mean, covariance })
    }

    /// Use a mean vector and covariance matrix supplied directly.
    ///
    /// The covariance must be square, match the mean and be symmetric up to
    /// rounding; it is symmetrized before being stored.
    pub fn from_parts(mean: DVector<f64>, covariance: DMatrix<f64>) -> Result<Self> {
        let n = mean.len();
        if n == 0 {
            return Err(FrontierError::InvalidParameter("mean vector is empty".into()));
        }
        if covariance.nrows() != n || covariance.ncols() != n {
            return Err(FrontierError::DimensionMismatch {
                expected: n,
                got: if covariance.nrows() != n {
                    covariance.nrows()
                } else {
                    covariance.ncols()
                },
            });
        }
        if mean.iter().chain(covariance.iter()).any(|v| !v.is_finite()) {
            return Err(FrontierError::InvalidParameter(
                "moments contain non-finite values".into(),
            ));
        }

        let scale = covariance.amax().max(1.0);
        let asymmetry = (&covariance - covariance.transpose()).amax();
        if asymmetry > SYMMETRY_TOL * scale {
            return Err(FrontierError::InvalidParameter(format!(
                "covariance matrix is not symmetric (max deviation {:e})",
                asymmetry
            )));
        }
        if (0..n).any(|i| covariance[(i, i)] < 0.0) {
            return Err(FrontierError::InvalidParameter(
                "covariance matrix has a negative variance".into(),
            ));
        }

        let covariance = (&covariance + covariance.transpose()) * 0.5;
        Ok(MomentEstimate { mean, covariance })
    }

    pub fn num_assets(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }
}
