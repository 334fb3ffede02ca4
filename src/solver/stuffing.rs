//! Matrix stuffing: converts a portfolio problem to solver format.
//!
//! This module builds the matrices (P, q, A, b) and cone specifications
//! required by Clarabel. Clarabel solves
//!
//! ```text
//! minimize    (1/2) x' P x + q' x
//! subject to  A x + s = b,  s in K
//! ```
//!
//! so equality rows go in the zero cone and `a' x <= b` rows in the
//! nonnegative cone.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CscMatrix;

use crate::model::{Constraints, MomentEstimate};
use crate::problem::{Objective, ReturnTarget};
use crate::sparse::{
    csc_from_triplets, csc_identity, csc_scale, csc_vstack, dense_to_csc,
    dense_upper_triangle_to_csc,
};

/// Cone dimensions for Clarabel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConeDims {
    /// Number of zero cone (equality) constraints.
    pub zero: usize,
    /// Number of nonnegative cone constraints.
    pub nonneg: usize,
}

impl ConeDims {
    /// Total number of constraint rows.
    pub fn total(&self) -> usize {
        self.zero + self.nonneg
    }
}

/// Stuffed problem ready for Clarabel.
#[derive(Debug)]
pub struct StuffedProblem {
    /// Quadratic cost matrix P (n x n, upper triangle).
    pub p: CscMatrix<f64>,
    /// Linear cost vector q (n).
    pub q: Vec<f64>,
    /// Constraint matrix A (m x n).
    pub a: CscMatrix<f64>,
    /// Constraint vector b (m).
    pub b: Vec<f64>,
    /// Cone dimensions.
    pub cone_dims: ConeDims,
}

impl StuffedProblem {
    /// Number of optimization variables (one per asset).
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }
}

/// Build the stuffed problem for a portfolio objective.
pub fn stuff_problem(
    objective: Objective,
    moments: &MomentEstimate,
    constraints: &Constraints,
    target: Option<ReturnTarget>,
) -> StuffedProblem {
    let (p, q) = stuff_objective(objective, moments);
    let (a, b, cone_dims) = stuff_constraints(moments, constraints, target);

    StuffedProblem {
        p,
        q,
        a,
        b,
        cone_dims,
    }
}

/// Stuff the objective into P and q.
///
/// Variance uses `P = 2 Sigma` so the reported objective `(1/2) w' P w` is
/// the portfolio variance itself. Return maximization is posed as the LP
/// `minimize -mu' w`.
fn stuff_objective(objective: Objective, moments: &MomentEstimate) -> (CscMatrix<f64>, Vec<f64>) {
    let n = moments.num_assets();
    match objective {
        Objective::MinimizeVariance => (
            dense_upper_triangle_to_csc(moments.covariance(), 2.0),
            vec![0.0; n],
        ),
        Objective::MaximizeReturn => (
            CscMatrix::zeros(n, n),
            moments.mean().iter().map(|m| -m).collect(),
        ),
    }
}

/// Stuff the constraints into A, b and the cone dimensions.
///
/// Row order: budget, exact return target (zero cone); lower bounds, upper
/// bounds, minimum return, extra inequalities (nonnegative cone).
fn stuff_constraints(
    moments: &MomentEstimate,
    constraints: &Constraints,
    target: Option<ReturnTarget>,
) -> (CscMatrix<f64>, Vec<f64>, ConeDims) {
    let n = moments.num_assets();
    let mu = moments.mean();

    // Zero cone
    let mut eq_rows = vec![DMatrix::from_element(1, n, 1.0)];
    let mut eq_b = vec![1.0];
    if let Some(ReturnTarget::Exactly(r)) = target {
        eq_rows.push(as_row(mu, 1.0));
        eq_b.push(r);
    }
    let a_eq = stack_dense_rows(&eq_rows, n);

    // Nonnegative cone: -w <= -lb, w <= ub
    let bounds = csc_vstack(&csc_scale(&csc_identity(n), -1.0), &csc_identity(n));
    let mut ineq_b: Vec<f64> = constraints.lower().iter().map(|lo| -lo).collect();
    ineq_b.extend(constraints.upper().iter().copied());

    let mut ineq_rows = Vec::new();
    if let Some(ReturnTarget::AtLeast(r)) = target {
        ineq_rows.push(as_row(mu, -1.0));
        ineq_b.push(-r);
    }
    for ineq in constraints.inequalities() {
        ineq_rows.push(as_row(&ineq.coeffs, 1.0));
        ineq_b.push(ineq.bound);
    }
    let a_ineq = if ineq_rows.is_empty() {
        bounds
    } else {
        csc_vstack(&bounds, &stack_dense_rows(&ineq_rows, n))
    };

    let cone_dims = ConeDims {
        zero: a_eq.nrows(),
        nonneg: a_ineq.nrows(),
    };

    let mut b = eq_b;
    b.extend(ineq_b);

    (csc_vstack(&a_eq, &a_ineq), b, cone_dims)
}

/// A scaled vector as a `1 x n` dense row.
fn as_row(v: &DVector<f64>, scale: f64) -> DMatrix<f64> {
    DMatrix::from_fn(1, v.len(), |_, j| v[j] * scale)
}

/// Stack `1 x n` dense rows into one CSC block.
fn stack_dense_rows(rows: &[DMatrix<f64>], n: usize) -> CscMatrix<f64> {
    rows.iter()
        .map(dense_to_csc)
        .reduce(|acc, row| csc_vstack(&acc, &row))
        .unwrap_or_else(|| csc_from_triplets(0, n, vec![], vec![], vec![]))
}
