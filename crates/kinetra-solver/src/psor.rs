//! Projected successive-over-relaxation solver.
//!
//! Sweeps the constraint rows in injection order, each sweep updating
//! one multiplier at a time against the current speeds. Unilateral rows
//! project the multiplier onto `λ ≥ 0`; bilateral rows are plain
//! Gauss-Seidel. Convergence is declared when the largest multiplier
//! change in a sweep drops below the tolerance.

use kinetra_core::{ConstraintMode, ConstraintSolver, SolveReport, SystemDescriptor};
use kinetra_types::constants::{DEFAULT_CFM, DEFAULT_MAX_ITERATIONS, DEFAULT_OMEGA, EPSILON};
use kinetra_types::{KinetraResult, Real};

use crate::{row_apply_impulse, row_dot_speed, row_schur_diag};

/// Iterative projected SOR over the assembled rows.
#[derive(Debug, Clone)]
pub struct PsorSolver {
    /// Maximum sweeps over all rows.
    pub max_iterations: usize,
    /// Over-relaxation factor (1.0 = plain Gauss-Seidel).
    pub omega: Real,
    /// Sweep terminates early when max |δλ| falls below this.
    pub tolerance: Real,
    /// Diagonal regularization added to each row's Schur entry.
    pub cfm: Real,
}

impl PsorSolver {
    pub fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS as usize,
            omega: DEFAULT_OMEGA,
            tolerance: 1e-10,
            cfm: DEFAULT_CFM,
        }
    }
}

impl Default for PsorSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSolver for PsorSolver {
    fn solve(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<SolveReport> {
        let n_dof = descriptor.n_dof();
        let n_constraints = descriptor.n_constraints();
        let (vars, cons) = descriptor.parts_mut();

        for var in vars.iter_mut() {
            var.increment_from_forces();
        }

        // Warm-started rows arrive with a nonzero multiplier; its
        // impulse must be in the speeds before the sweeps refine it.
        for c in cons.iter() {
            if c.lambda != 0.0 {
                row_apply_impulse(vars, c, c.lambda);
            }
        }

        // Rows whose diagonal vanishes touch only kinematic coordinates
        // and are skipped; their multiplier stays zero.
        let diag: Vec<Real> = cons
            .iter()
            .map(|c| {
                let g = row_schur_diag(vars, c);
                if g > EPSILON {
                    g + self.cfm
                } else {
                    0.0
                }
            })
            .collect();

        let mut iterations = 0;
        let mut converged = false;
        for _ in 0..self.max_iterations {
            iterations += 1;
            let mut max_delta: Real = 0.0;
            for (ci, c) in cons.iter_mut().enumerate() {
                if diag[ci] == 0.0 {
                    continue;
                }
                let residual = row_dot_speed(vars, c) + c.rhs;
                let mut delta = -self.omega * residual / diag[ci];
                if c.mode == ConstraintMode::Unilateral {
                    let projected = (c.lambda + delta).max(0.0);
                    delta = projected - c.lambda;
                }
                if delta != 0.0 {
                    c.lambda += delta;
                    row_apply_impulse(vars, c, delta);
                }
                max_delta = max_delta.max(delta.abs());
            }
            if max_delta < self.tolerance {
                converged = true;
                break;
            }
        }

        let mut residual: Real = 0.0;
        for c in cons.iter() {
            let r = row_dot_speed(vars, c) + c.rhs;
            let violation = match c.mode {
                ConstraintMode::Bilateral => r.abs(),
                ConstraintMode::Unilateral => {
                    if c.lambda > 0.0 {
                        r.abs()
                    } else {
                        (-r).max(0.0)
                    }
                }
            };
            residual = residual.max(violation);
        }

        tracing::debug!(iterations, residual, n_constraints, "psor solve done");

        Ok(SolveReport {
            iterations,
            converged,
            residual,
            n_dof,
            n_constraints,
        })
    }
}
