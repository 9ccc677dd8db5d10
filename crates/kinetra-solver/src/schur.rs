//! Direct solver on the constraint-space Schur complement.
//!
//! Assembles `S = J · M⁻¹ · Jᵀ + cfm·I` as a sparse matrix and solves
//! `S λ = −(J·q_free + b)` with one LLᵀ factorization per step. The
//! cfm regularization keeps `S` positive definite when rows touch
//! kinematic (singular-mass) coordinates or are redundant.
//!
//! Bilateral rows only. Unilateral rows need an active-set or
//! projection scheme and are rejected here; use [`PsorSolver`] for
//! problems containing them.
//!
//! [`PsorSolver`]: crate::PsorSolver

use kinetra_core::{ConstraintMode, ConstraintSolver, SolveReport, SystemDescriptor};
use kinetra_math::sparse::{CsrMatrix, SparseSolver};
use kinetra_math::cholesky::FaerCholesky;
use kinetra_types::constants::DEFAULT_CFM;
use kinetra_types::{KinetraError, KinetraResult, Real};

use crate::{row_apply_impulse, row_dot_speed};

/// Direct sparse-Cholesky solver for bilateral assemblies.
pub struct SchurSolver {
    /// Diagonal regularization added to the Schur complement.
    pub cfm: Real,
    cholesky: FaerCholesky,
}

impl SchurSolver {
    pub fn new() -> Self {
        Self {
            cfm: DEFAULT_CFM,
            cholesky: FaerCholesky::new(),
        }
    }
}

impl Default for SchurSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSolver for SchurSolver {
    fn solve(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<SolveReport> {
        let n_dof = descriptor.n_dof();
        let n_constraints = descriptor.n_constraints();
        let (vars, cons) = descriptor.parts_mut();

        for var in vars.iter_mut() {
            var.increment_from_forces();
        }

        if n_constraints == 0 {
            return Ok(SolveReport {
                iterations: 0,
                converged: true,
                residual: 0.0,
                n_dof,
                n_constraints: 0,
            });
        }

        if cons.iter().any(|c| c.mode == ConstraintMode::Unilateral) {
            return Err(KinetraError::InvalidConfig(
                "direct Schur solver handles bilateral rows only".into(),
            ));
        }

        // Incidence: which rows touch each variable block, and through
        // which Jacobian segment.
        let mut incidence: Vec<Vec<(usize, bool)>> = vec![Vec::new(); vars.len()];
        for (ci, c) in cons.iter().enumerate() {
            incidence[c.var_a.index()].push((ci, true));
            if let Some(hb) = c.var_b {
                incidence[hb.index()].push((ci, false));
            }
        }

        fn jac_of(c: &kinetra_core::ConstraintBlock, side_a: bool) -> &[Real] {
            if side_a {
                &c.jac_a
            } else {
                &c.jac_b
            }
        }

        // S accumulates one block per variable shared by a row pair;
        // duplicate triplets are merged by the CSR builder.
        let mut triplets: Vec<(usize, usize, Real)> = Vec::new();
        for (vi, rows) in incidence.iter().enumerate() {
            let var = &vars[vi];
            for (a, &(ri, ra)) in rows.iter().enumerate() {
                let ji = jac_of(&cons[ri], ra);
                for &(rj, rb) in rows.iter().skip(a) {
                    let jj = jac_of(&cons[rj], rb);
                    let mut s = 0.0;
                    for k in 0..ji.len() {
                        s += ji[k] * var.mass.inv_entry(k) * jj[k];
                    }
                    if s != 0.0 {
                        triplets.push((ri, rj, s));
                        if ri != rj {
                            triplets.push((rj, ri, s));
                        }
                    }
                }
            }
        }
        for ci in 0..n_constraints {
            triplets.push((ci, ci, self.cfm));
        }
        let schur = CsrMatrix::from_triplets(n_constraints, n_constraints, &triplets);

        let rhs: Vec<Real> = cons
            .iter()
            .map(|c| -(row_dot_speed(vars, c) + c.rhs))
            .collect();

        self.cholesky
            .factorize(&schur)
            .map_err(KinetraError::Factorization)?;
        let mut lambda = vec![0.0; n_constraints];
        self.cholesky
            .solve(&rhs, &mut lambda)
            .map_err(KinetraError::Factorization)?;

        for (c, &l) in cons.iter_mut().zip(&lambda) {
            c.lambda = l;
            row_apply_impulse(vars, c, l);
        }

        let residual = cons
            .iter()
            .map(|c| (row_dot_speed(vars, c) + c.rhs).abs())
            .fold(0.0, Real::max);

        tracing::debug!(
            residual,
            n_constraints,
            nnz = schur.nnz(),
            "schur solve done"
        );

        Ok(SolveReport {
            iterations: 1,
            converged: true,
            residual,
            n_dof,
            n_constraints,
        })
    }
}
