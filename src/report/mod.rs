//! Reporting: the data handed to tables, plots and exports.
//!
//! This module provides:
//! - [`SessionReport`], the serializable result of one session run
//! - CSV and JSON export
//! - Console tables
//! - HTML plots

pub mod export;
pub mod plot;
pub mod table;

use serde::Serialize;

use crate::frontier::{FrontierPoint, LinePoint, RiskReturn, TargetMatch};
use crate::model::{AssetUniverse, Holding};

/// A labelled point for scatter plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub label: String,
    pub risk: f64,
    #[serde(rename = "return")]
    pub expected_return: f64,
}

impl ScatterPoint {
    pub fn new(label: impl Into<String>, rr: RiskReturn) -> Self {
        ScatterPoint {
            label: label.into(),
            risk: rr.risk,
            expected_return: rr.expected_return,
        }
    }
}

/// A labelled portfolio with its sparse weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub label: String,
    pub risk: f64,
    #[serde(rename = "return")]
    pub expected_return: f64,
    pub holdings: Vec<Holding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl PortfolioReport {
    pub fn from_point(
        label: impl Into<String>,
        point: &FrontierPoint,
        universe: &AssetUniverse,
        min_weight: f64,
    ) -> Self {
        PortfolioReport {
            label: label.into(),
            risk: point.risk,
            expected_return: point.expected_return,
            holdings: point.portfolio.holdings(universe, min_weight),
            warning: None,
        }
    }

    pub fn from_match(target: &TargetMatch, universe: &AssetUniverse, min_weight: f64) -> Self {
        let label = format!("Target {} {}", target.kind, target.requested);
        PortfolioReport {
            warning: target.warning.map(|w| w.to_string()),
            ..Self::from_point(label, &target.point, universe, min_weight)
        }
    }

    pub fn scatter_point(&self) -> ScatterPoint {
        ScatterPoint {
            label: self.label.clone(),
            risk: self.risk,
            expected_return: self.expected_return,
        }
    }
}

/// Everything one session run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub assets: Vec<String>,
    pub periods: usize,
    /// Ordered `(risk, return)` frontier line.
    pub frontier: Vec<LinePoint>,
    /// Frontier portfolios with their weights, in frontier order.
    pub frontier_portfolios: Vec<PortfolioReport>,
    /// Equal-weight portfolio and benchmark indices.
    pub benchmarks: Vec<ScatterPoint>,
    /// Equal-weight portfolio with its weights.
    pub equal_weight: PortfolioReport,
    /// Portfolios matched to return or risk targets.
    pub matches: Vec<PortfolioReport>,
}

impl SessionReport {
    /// Labelled points for the scatter plot: benchmarks then matches.
    pub fn scatter_points(&self) -> Vec<ScatterPoint> {
        self.benchmarks
            .iter()
            .cloned()
            .chain(self.matches.iter().map(PortfolioReport::scatter_point))
            .collect()
    }

    /// Warnings raised by clamped targets.
    pub fn warnings(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter_map(|m| m.warning.as_deref())
            .collect()
    }
}
