//! # efficient-frontier
//!
//! Long-only mean-variance portfolio optimization.
//!
//! efficient-frontier estimates asset moments from historical returns, builds
//! a discretized efficient frontier, and finds the frontier portfolio for a
//! requested return or risk. Every optimization is a small convex program
//! solved with the Clarabel interior-point solver.
//!
//! ## Quick Start
//!
//! ```ignore
//! use efficient_frontier::prelude::*;
//!
//! let sample = ReturnSample::from_rows(&rows)?;
//! let moments = MomentEstimate::from_sample(&sample)?;
//! let constraints = Constraints::long_only(moments.num_assets());
//!
//! let builder = FrontierBuilder::new(&moments, &constraints)?;
//! let frontier = builder.build(20)?;
//!
//! let matcher = TargetMatcher::new(builder)?;
//! let hit = matcher.by_return(0.012)?;
//! if let Some(warning) = hit.warning {
//!     println!("{}", warning);
//! }
//! ```
//!
//! ## Problems solved
//!
//! - **Minimum variance**: `minimize w' Sigma w` s.t. `sum(w) == 1`, `lb <= w <= ub`
//! - **Maximum return**: `maximize mu' w` under the same constraints (an LP)
//! - **Frontier level**: minimum variance with `mu' w == r`
//!
//! ## Architecture
//!
//! - **Model**: asset universe, return sample, moments, constraints, portfolios
//! - **Problem/Solver**: builder API, matrix stuffing, Clarabel integration
//! - **Frontier**: evaluation, frontier construction, target matching
//! - **Session/Report**: the end-to-end pipeline and its exports

pub mod config;
pub mod data;
pub mod error;
pub mod frontier;
pub mod model;
pub mod problem;
pub mod report;
pub mod session;
pub mod solver;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use efficient_frontier::prelude::*;
/// ```
pub mod prelude {
    // Model
    pub use crate::model::{
        AssetUniverse, Constraints, Holding, LinearInequality, MomentEstimate, Portfolio,
        ReturnSample,
    };

    // Frontier
    pub use crate::frontier::{
        evaluate, evaluate_all, evaluate_portfolio, FrontierBuilder, FrontierLimits,
        FrontierPoint, FrontierSet, MatchSettings, RangeWarning, RiskReturn, TargetKind,
        TargetMatch, TargetMatcher,
    };

    // Problem
    pub use crate::problem::{Objective, Problem, ProblemBuilder, ReturnTarget};

    // Solver
    pub use crate::solver::{Settings, Solution, SolveStatus};

    // Session
    pub use crate::config::SessionConfig;
    pub use crate::session::{RunRequest, Session};

    // Errors
    pub use crate::error::{FrontierError, Result};
}

// Re-export main types at crate root
pub use error::{FrontierError, Result};
pub use frontier::{FrontierBuilder, FrontierSet, TargetMatcher};
pub use session::Session;
