//! Solver interface for efficient-frontier.
//!
//! This module provides:
//! - Matrix stuffing to convert portfolio problems to solver format
//! - Clarabel solver integration

pub mod clarabel;
pub mod stuffing;

pub use self::clarabel::{solve, Settings, Solution, SolveStatus};
pub use stuffing::{stuff_problem, ConeDims, StuffedProblem};
