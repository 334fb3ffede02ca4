//! Session configuration files.
//!
//! A session can be described entirely in TOML so runs are reproducible:
//!
//! ```toml
//! [data]
//! path = "returns.csv"
//! benchmarks = ["Index1", "Index2"]
//!
//! [frontier]
//! num_portfolios = 20
//!
//! [targets]
//! target_return = 0.8
//! target_risk = 4.0
//!
//! [output]
//! csv = "portfolios.csv"
//! plot = "frontier.html"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::DataConfig;
use crate::error::{FrontierError, Result};
use crate::frontier::MatchSettings;
use crate::model::Constraints;
use crate::solver::Settings;

/// Complete session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub frontier: FrontierSettings,
    #[serde(default)]
    pub targets: TargetSettings,
    #[serde(default)]
    pub solver: Settings,
    #[serde(default)]
    pub matcher: MatchSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Input table location and layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub table: DataConfig,
}

/// Frontier discretization and per-asset bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierSettings {
    /// Number of frontier portfolios.
    #[serde(default = "default_num_portfolios")]
    pub num_portfolios: usize,
    /// Lower weight bound applied to every asset.
    #[serde(default)]
    pub lower_bound: f64,
    /// Upper weight bound applied to every asset.
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f64,
}

fn default_num_portfolios() -> usize { 20 }
fn default_upper_bound() -> f64 { 1.0 }
fn default_min_weight() -> f64 { 1e-4 }

impl Default for FrontierSettings {
    fn default() -> Self {
        Self {
            num_portfolios: default_num_portfolios(),
            lower_bound: 0.0,
            upper_bound: default_upper_bound(),
        }
    }
}

impl FrontierSettings {
    /// Constraints for `n` assets with these bounds.
    pub fn constraints(&self, n: usize) -> Result<Constraints> {
        if self.lower_bound == 0.0 && self.upper_bound == 1.0 {
            return Ok(Constraints::long_only(n));
        }
        Constraints::with_bounds(
            DVector::from_element(n, self.lower_bound),
            DVector::from_element(n, self.upper_bound),
        )
    }
}

/// Optional return and risk targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSettings {
    #[serde(default)]
    pub target_return: Option<f64>,
    #[serde(default)]
    pub target_risk: Option<f64>,
}

/// Where to write results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// CSV export of `label,return,risk` rows.
    #[serde(default)]
    pub csv: Option<PathBuf>,
    /// JSON session report.
    #[serde(default)]
    pub json: Option<PathBuf>,
    /// HTML frontier plot.
    #[serde(default)]
    pub plot: Option<PathBuf>,
    /// Weights at or below this fraction are hidden in weight tables.
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            csv: None,
            json: None,
            plot: None,
            min_weight: default_min_weight(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading config from: {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML text.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Check values that TOML types cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.frontier.num_portfolios == 0 {
            return Err(FrontierError::InvalidParameter(
                "frontier.num_portfolios must be at least 1".into(),
            ));
        }
        if self.frontier.lower_bound > self.frontier.upper_bound {
            return Err(FrontierError::InvalidParameter(format!(
                "frontier.lower_bound {} exceeds upper_bound {}",
                self.frontier.lower_bound, self.frontier.upper_bound
            )));
        }
        if !(self.output.min_weight >= 0.0) {
            return Err(FrontierError::InvalidParameter(
                "output.min_weight must be non-negative".into(),
            ));
        }
        if self.matcher.max_iterations == 0 || !(self.matcher.risk_tolerance > 0.0) {
            return Err(FrontierError::InvalidParameter(
                "matcher needs a positive tolerance and iteration cap".into(),
            ));
        }
        Ok(())
    }
}
