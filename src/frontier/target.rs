//! Target matching: frontier portfolios for a requested return or risk.
//!
//! Requests outside the frontier's range are clamped to the nearest limit
//! portfolio and the clamp is reported as a [`RangeWarning`] alongside the
//! result rather than as an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::builder::{FrontierBuilder, FrontierLimits, FrontierPoint};
use crate::error::{FrontierError, Result};

/// Settings for risk matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Risk tolerance relative to the frontier's maximum risk.
    pub risk_tolerance: f64,
    /// Bisection iteration cap.
    pub max_iterations: u32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        MatchSettings {
            risk_tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Which quantity a match was requested by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Return,
    Risk,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Return => write!(f, "return"),
            TargetKind::Risk => write!(f, "risk"),
        }
    }
}

/// Non-fatal notice that a target was outside the frontier and got clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeWarning {
    BelowRange { requested: f64, minimum: f64 },
    AboveRange { requested: f64, maximum: f64 },
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeWarning::BelowRange { requested, minimum } => write!(
                f,
                "target {} is below the frontier minimum {}; using the minimum-risk portfolio",
                requested, minimum
            ),
            RangeWarning::AboveRange { requested, maximum } => write!(
                f,
                "target {} is above the frontier maximum {}; using the maximum-return portfolio",
                requested, maximum
            ),
        }
    }
}

/// Result of a target request.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetMatch {
    pub kind: TargetKind,
    pub requested: f64,
    pub point: FrontierPoint,
    pub warning: Option<RangeWarning>,
    /// Solver round trips spent (0 when a limit portfolio was reused).
    pub iterations: u32,
}

impl TargetMatch {
    fn clamped(
        kind: TargetKind,
        requested: f64,
        point: &FrontierPoint,
        warning: RangeWarning,
    ) -> Self {
        warn!(%kind, "{}", warning);
        TargetMatch {
            kind,
            requested,
            point: point.clone(),
            warning: Some(warning),
            iterations: 0,
        }
    }

    fn exact(kind: TargetKind, requested: f64, point: FrontierPoint, iterations: u32) -> Self {
        TargetMatch {
            kind,
            requested,
            point,
            warning: None,
            iterations,
        }
    }
}

/// Matches return or risk targets against the continuous frontier.
#[derive(Debug, Clone)]
pub struct TargetMatcher<'a> {
    builder: FrontierBuilder<'a>,
    limits: FrontierLimits,
    settings: MatchSettings,
}

impl<'a> TargetMatcher<'a> {
    /// Solve the frontier limits once and keep them for all requests.
    pub fn new(builder: FrontierBuilder<'a>) -> Result<Self> {
        let limits = builder.limits()?;
        Ok(Self::with_limits(builder, limits))
    }

    /// Reuse limits solved elsewhere.
    pub fn with_limits(builder: FrontierBuilder<'a>, limits: FrontierLimits) -> Self {
        TargetMatcher {
            builder,
            limits,
            settings: MatchSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: MatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn limits(&self) -> &FrontierLimits {
        &self.limits
    }

    /// Absolute risk tolerance.
    pub fn risk_tolerance(&self) -> f64 {
        let (_, max_risk) = self.limits.risk_range();
        self.settings.risk_tolerance * max_risk.max(f64::EPSILON)
    }

    /// Slack for comparing a risk target with the limit risks.
    ///
    /// Limit variances are only accurate to the solver's absolute gap, which
    /// becomes its square root once turned into a standard deviation. A
    /// riskless portfolio can come back with a risk of a few `1e-6`.
    pub fn risk_range_tolerance(&self) -> f64 {
        let solver_floor = self.builder.settings().tol_gap_abs.max(0.0).sqrt();
        self.risk_tolerance().max(solver_floor)
    }

    /// Minimum-risk portfolio with return equal to `target`.
    ///
    /// Inside the frontier's return range this is an exact solve at the
    /// target, not an interpolation between discretized frontier points.
    pub fn by_return(&self, target: f64) -> Result<TargetMatch> {
        check_finite(target, TargetKind::Return)?;
        let (r_min, r_max) = self.limits.return_range();
        let tol = self.builder.return_tolerance();

        if target < r_min - tol {
            return Ok(TargetMatch::clamped(
                TargetKind::Return,
                target,
                &self.limits.min_risk,
                RangeWarning::BelowRange {
                    requested: target,
                    minimum: r_min,
                },
            ));
        }
        if target > r_max + tol {
            return Ok(TargetMatch::clamped(
                TargetKind::Return,
                target,
                &self.limits.max_return,
                RangeWarning::AboveRange {
                    requested: target,
                    maximum: r_max,
                },
            ));
        }

        let on_limit = target <= r_min + tol || target >= r_max - tol;
        let point = self.builder.point_at_return(target, &self.limits)?;
        Ok(TargetMatch::exact(
            TargetKind::Return,
            target,
            point,
            if on_limit { 0 } else { 1 },
        ))
    }

    /// Maximum-return portfolio with risk equal to `target`.
    ///
    /// Frontier risk is non-decreasing in return, so this bisects on the
    /// return level until the achieved risk is within tolerance of the
    /// target. The best level found keeps risk at or below the target.
    pub fn by_risk(&self, target: f64) -> Result<TargetMatch> {
        check_finite(target, TargetKind::Risk)?;
        let (s_min, s_max) = self.limits.risk_range();
        let tol = self.risk_tolerance();
        let range_tol = self.risk_range_tolerance();

        if target < s_min - range_tol {
            return Ok(TargetMatch::clamped(
                TargetKind::Risk,
                target,
                &self.limits.min_risk,
                RangeWarning::BelowRange {
                    requested: target,
                    minimum: s_min,
                },
            ));
        }
        if target > s_max + range_tol {
            return Ok(TargetMatch::clamped(
                TargetKind::Risk,
                target,
                &self.limits.max_return,
                RangeWarning::AboveRange {
                    requested: target,
                    maximum: s_max,
                },
            ));
        }
        if target >= s_max - tol {
            return Ok(TargetMatch::exact(
                TargetKind::Risk,
                target,
                self.limits.max_return.clone(),
                0,
            ));
        }
        if target <= s_min + tol {
            return Ok(TargetMatch::exact(
                TargetKind::Risk,
                target,
                self.limits.min_risk.clone(),
                0,
            ));
        }

        let (mut lo, mut hi) = self.limits.return_range();
        let bracket_tol = self.builder.return_tolerance();
        let mut best = self.limits.min_risk.clone();

        for iteration in 1..=self.settings.max_iterations {
            let mid = 0.5 * (lo + hi);
            let point = self.builder.point_at_return(mid, &self.limits)?;
            debug!(iteration, level = mid, risk = point.risk, target, "risk bisection");

            if (point.risk - target).abs() <= tol {
                return Ok(TargetMatch::exact(TargetKind::Risk, target, point, iteration));
            }
            if point.risk < target {
                lo = mid;
                best = point;
            } else {
                hi = mid;
            }
            // Flat stretch of the frontier: every remaining level has the same return.
            if hi - lo <= bracket_tol {
                return Ok(TargetMatch::exact(TargetKind::Risk, target, best, iteration));
            }
        }

        Err(FrontierError::Convergence {
            iterations: self.settings.max_iterations,
            context: format!(
                "risk target {} not reached; best risk {} (tolerance {})",
                target, best.risk, tol
            ),
        })
    }

    /// Match several return targets in order.
    pub fn by_returns(&self, targets: &[f64]) -> Result<Vec<TargetMatch>> {
        targets.iter().map(|&t| self.by_return(t)).collect()
    }

    /// Match several risk targets in order.
    pub fn by_risks(&self, targets: &[f64]) -> Result<Vec<TargetMatch>> {
        targets.iter().map(|&t| self.by_risk(t)).collect()
    }
}

fn check_finite(target: f64, kind: TargetKind) -> Result<()> {
    if target.is_finite() {
        Ok(())
    } else {
        Err(FrontierError::InvalidParameter(format!(
            "target {} must be finite, got {}",
            kind, target
        )))
    }
}
