//! The pluggable constraint-solver interface.
//!
//! A solver consumes a fully assembled descriptor: variable blocks with
//! loaded speeds and accumulated impulses, constraint rows with
//! Jacobians and right-hand sides. It leaves the solved speeds in each
//! block's `qb` and the multipliers in each row's `lambda`.

use crate::descriptor::SystemDescriptor;
use kinetra_types::{KinetraResult, Real};

/// Diagnostics from one solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveReport {
    /// Iterations taken (1 for direct solvers).
    pub iterations: usize,
    /// Whether the tolerance was met. A non-converged iterative solve
    /// still leaves its best estimate in place, never an error.
    pub converged: bool,
    /// Final constraint-space residual norm (max |J·q + b| over rows,
    /// projected rows excluded for unilateral modes).
    pub residual: Real,
    /// Velocity-level DOFs in the solved problem.
    pub n_dof: usize,
    /// Scalar constraint rows in the solved problem.
    pub n_constraints: usize,
}

/// A solver for the assembled mixed complementarity problem.
pub trait ConstraintSolver {
    /// Solves in place. On entry each variable block holds its loaded
    /// speed in `qb` and its impulse accumulator in `fb`; on exit `qb`
    /// holds the constrained new speed and each row's `lambda` the
    /// solved multiplier.
    fn solve(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<SolveReport>;
}
