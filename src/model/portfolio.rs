//! Portfolio weight vectors.

use nalgebra::DVector;
use serde::Serialize;

use super::universe::AssetUniverse;

/// A weight vector indexed like the asset universe.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    weights: DVector<f64>,
}

/// One non-negligible position of a portfolio, as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub asset: String,
    pub weight_pct: f64,
}

impl Portfolio {
    pub fn new(weights: DVector<f64>) -> Self {
        Portfolio { weights }
    }

    pub fn from_vec(weights: Vec<f64>) -> Self {
        Portfolio {
            weights: DVector::from_vec(weights),
        }
    }

    /// `1/n` in every asset.
    pub fn equal_weight(n: usize) -> Self {
        Portfolio {
            weights: DVector::from_element(n, 1.0 / n.max(1) as f64),
        }
    }

    /// Everything in the asset at `index`.
    pub fn single_asset(n: usize, index: usize) -> Self {
        let mut weights = DVector::zeros(n);
        if index < n {
            weights[index] = 1.0;
        }
        Portfolio { weights }
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Positions with weight above `min_weight`, in universe order.
    ///
    /// Interior-point solutions carry tiny positive weights on assets that
    /// are really excluded; the threshold hides them.
    pub fn holdings(&self, universe: &AssetUniverse, min_weight: f64) -> Vec<Holding> {
        universe
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, w)| **w > min_weight)
            .map(|(asset, w)| Holding {
                asset: asset.to_string(),
                weight_pct: w * 100.0,
            })
            .collect()
    }
}

impl From<Vec<f64>> for Portfolio {
    fn from(weights: Vec<f64>) -> Self {
        Portfolio::from_vec(weights)
    }
}
