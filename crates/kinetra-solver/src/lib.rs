//! # kinetra-solver
//!
//! Constraint solvers for the assembled multibody problem: an iterative
//! projected successive-over-relaxation solver and a direct solver that
//! factorizes the Schur complement with a sparse Cholesky backend.
//!
//! Both consume a [`SystemDescriptor`](kinetra_core::SystemDescriptor)
//! whose variable blocks carry loaded speeds and impulses, and leave
//! solved speeds in `qb` and multipliers in each row's `lambda`.
//!
//! ## Key Types
//!
//! - [`PsorSolver`] — fixed-iteration projected SOR, handles unilateral
//!   rows by projection
//! - [`SchurSolver`] — one sparse LLᵀ factorization per step, bilateral
//!   rows only

pub mod psor;
pub mod schur;

pub use psor::PsorSolver;
pub use schur::SchurSolver;

use kinetra_core::{ConstraintBlock, VariableBlock};
use kinetra_types::Real;

/// `J_i · qb` over both variable segments of a row.
pub(crate) fn row_dot_speed(vars: &[VariableBlock], c: &ConstraintBlock) -> Real {
    let va = &vars[c.var_a.index()];
    let mut acc = c
        .jac_a
        .iter()
        .zip(&va.qb)
        .map(|(j, q)| j * q)
        .sum::<Real>();
    if let Some(hb) = c.var_b {
        let vb = &vars[hb.index()];
        acc += c
            .jac_b
            .iter()
            .zip(&vb.qb)
            .map(|(j, q)| j * q)
            .sum::<Real>();
    }
    acc
}

/// Diagonal Schur entry `J_i · M⁻¹ · J_iᵀ` of a row. Zero when every
/// touched mass entry is singular (a fully kinematic row).
pub(crate) fn row_schur_diag(vars: &[VariableBlock], c: &ConstraintBlock) -> Real {
    let va = &vars[c.var_a.index()];
    let mut g = c
        .jac_a
        .iter()
        .enumerate()
        .map(|(k, j)| j * j * va.mass.inv_entry(k))
        .sum::<Real>();
    if let Some(hb) = c.var_b {
        let vb = &vars[hb.index()];
        g += c
            .jac_b
            .iter()
            .enumerate()
            .map(|(k, j)| j * j * vb.mass.inv_entry(k))
            .sum::<Real>();
    }
    g
}

/// Applies `qb += M⁻¹ · Jᵀ · dl` for one row. Singular mass entries
/// absorb nothing, so kinematic blocks never move.
pub(crate) fn row_apply_impulse(vars: &mut [VariableBlock], c: &ConstraintBlock, dl: Real) {
    let va = &mut vars[c.var_a.index()];
    for (k, j) in c.jac_a.iter().enumerate() {
        va.qb[k] += va.mass.inv_entry(k) * j * dl;
    }
    if let Some(hb) = c.var_b {
        let vb = &mut vars[hb.index()];
        for (k, j) in c.jac_b.iter().enumerate() {
            vb.qb[k] += vb.mass.inv_entry(k) * j * dl;
        }
    }
}
