//! Portfolio problem definition and solving API.
//!
//! A `Problem` pairs an objective (minimize variance or maximize expected
//! return) with the moment estimate, the weight constraints and an optional
//! return target.
//!
//! Use the builder pattern to construct problems:
//! ```ignore
//! let solution = Problem::minimize_variance(&moments, &constraints)
//!     .target_return(0.012)
//!     .solve()?;
//! ```

use nalgebra::DVector;

use crate::error::{FrontierError, Result};
use crate::model::{Constraints, MomentEstimate};
use crate::solver::{solve, stuff_problem, Settings, Solution, SolveStatus};

/// Objective type for portfolio problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Minimize `w' Sigma w`.
    MinimizeVariance,
    /// Maximize `mu' w` (internally converted to minimization).
    MaximizeReturn,
}

/// Constraint on the expected portfolio return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnTarget {
    /// `mu' w == r`
    Exactly(f64),
    /// `mu' w >= r`
    AtLeast(f64),
}

/// A portfolio optimization problem.
#[derive(Debug, Clone)]
pub struct Problem<'a> {
    pub objective: Objective,
    pub moments: &'a MomentEstimate,
    pub constraints: &'a Constraints,
    pub target: Option<ReturnTarget>,
}

impl<'a> Problem<'a> {
    /// Create a variance minimization problem.
    pub fn minimize_variance(
        moments: &'a MomentEstimate,
        constraints: &'a Constraints,
    ) -> ProblemBuilder<'a> {
        ProblemBuilder::new(Objective::MinimizeVariance, moments, constraints)
    }

    /// Create a return maximization problem.
    pub fn maximize_return(
        moments: &'a MomentEstimate,
        constraints: &'a Constraints,
    ) -> ProblemBuilder<'a> {
        ProblemBuilder::new(Objective::MaximizeReturn, moments, constraints)
    }

    /// Solve the problem with default settings.
    pub fn solve(&self) -> Result<Solution> {
        self.solve_with(&Settings::default())
    }

    /// Solve the problem with custom settings.
    pub fn solve_with(&self, settings: &Settings) -> Result<Solution> {
        let n = self.moments.num_assets();
        if self.constraints.num_assets() != n {
            return Err(FrontierError::DimensionMismatch {
                expected: n,
                got: self.constraints.num_assets(),
            });
        }

        let stuffed = stuff_problem(self.objective, self.moments, self.constraints, self.target);
        let mut solution = solve(&stuffed, settings)?;

        // Adjust for maximization
        if self.objective == Objective::MaximizeReturn {
            solution.value = solution.value.map(|v| -v);
        }

        match solution.status {
            SolveStatus::Optimal => Ok(solution),
            SolveStatus::Infeasible => Err(FrontierError::InfeasibleConstraint(format!(
                "no weights satisfy the constraints{}",
                self.target_description()
            ))),
            SolveStatus::Unbounded => {
                Err(FrontierError::SolverError("Problem is unbounded".into()))
            }
            SolveStatus::MaxIterations => Err(FrontierError::Convergence {
                iterations: solution.iterations,
                context: "solver iteration or time limit reached".into(),
            }),
            SolveStatus::NumericalError => Err(FrontierError::NumericalError(
                "Solver encountered numerical difficulties".into(),
            )),
            SolveStatus::Unknown => {
                Err(FrontierError::SolverError("Unknown solver status".into()))
            }
        }
    }

    /// Solve and return the optimal weights.
    pub fn solve_weights(&self, settings: &Settings) -> Result<DVector<f64>> {
        self.solve_with(settings)?
            .weights
            .ok_or_else(|| FrontierError::SolverError("solver returned no weights".into()))
    }

    fn target_description(&self) -> String {
        match self.target {
            Some(ReturnTarget::Exactly(r)) => format!(" at return {}", r),
            Some(ReturnTarget::AtLeast(r)) => format!(" with return >= {}", r),
            None => String::new(),
        }
    }
}

/// Builder for constructing problems.
#[derive(Debug, Clone)]
pub struct ProblemBuilder<'a> {
    objective: Objective,
    moments: &'a MomentEstimate,
    constraints: &'a Constraints,
    target: Option<ReturnTarget>,
}

impl<'a> ProblemBuilder<'a> {
    fn new(
        objective: Objective,
        moments: &'a MomentEstimate,
        constraints: &'a Constraints,
    ) -> Self {
        ProblemBuilder {
            objective,
            moments,
            constraints,
            target: None,
        }
    }

    /// Require `mu' w == r`.
    pub fn target_return(mut self, r: f64) -> Self {
        self.target = Some(ReturnTarget::Exactly(r));
        self
    }

    /// Require `mu' w >= r`.
    pub fn min_return(mut self, r: f64) -> Self {
        self.target = Some(ReturnTarget::AtLeast(r));
        self
    }

    /// Build the problem.
    pub fn build(self) -> Problem<'a> {
        Problem {
            objective: self.objective,
            moments: self.moments,
            constraints: self.constraints,
            target: self.target,
        }
    }

    /// Build and solve the problem with default settings.
    pub fn solve(self) -> Result<Solution> {
        self.build().solve()
    }

    /// Build and solve the problem with custom settings.
    pub fn solve_with(self, settings: &Settings) -> Result<Solution> {
        self.build().solve_with(settings)
    }
}
