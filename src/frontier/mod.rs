//! Efficient frontier algorithms.
//!
//! This module provides:
//! - Portfolio evaluation (risk and return of any weight vector)
//! - Frontier construction between the minimum-risk and maximum-return limits
//! - Target matching by return or by risk

pub mod builder;
pub mod evaluate;
pub mod target;

pub use builder::{FrontierBuilder, FrontierLimits, FrontierPoint, FrontierSet, LinePoint};
pub use evaluate::{evaluate, evaluate_all, evaluate_portfolio, RiskReturn};
pub use target::{MatchSettings, RangeWarning, TargetKind, TargetMatch, TargetMatcher};
