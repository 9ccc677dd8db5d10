//! Constraint blocks: scalar bilateral (or unilateral) rows with
//! Jacobians onto one or two variable blocks.
//!
//! Like variable blocks, constraint blocks are transient: they exist
//! only within one assembly cycle and are addressed through the handle
//! returned by `SystemDescriptor::inject_constraint`.

use crate::descriptor::VariableHandle;
use kinetra_types::Real;

/// Whether a row is an equality or a `λ ≥ 0` inequality.
///
/// The bilateral joints of this engine use `Bilateral` throughout;
/// `Unilateral` is representable for contact-style rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintMode {
    Bilateral,
    Unilateral,
}

/// One scalar constraint row.
///
/// The velocity-level equation is `J·v + b = 0` (bilateral), where `J`
/// is split into the two referenced variable blocks' segments and `b`
/// accumulates the stabilization term (`C/h`, clamped) plus the
/// rheonomic term (`Ct`).
#[derive(Debug, Clone)]
pub struct ConstraintBlock {
    /// First referenced variable block.
    pub var_a: VariableHandle,
    /// Jacobian segment for the first block (length = its `dof_w`).
    pub jac_a: Vec<Real>,
    /// Optional second referenced variable block (single-variable rows
    /// arise when the coupled partner is fixed).
    pub var_b: Option<VariableHandle>,
    /// Jacobian segment for the second block.
    pub jac_b: Vec<Real>,
    /// Right-hand-side accumulator `b`.
    pub rhs: Real,
    /// Last loaded positional violation `C` (diagnostic, unclamped).
    pub violation: Real,
    /// Solved Lagrange multiplier (impulse units).
    pub lambda: Real,
    pub mode: ConstraintMode,
    /// Row index in the global reaction vector for this assembly.
    row: usize,
}

impl ConstraintBlock {
    /// A row referencing a single variable block.
    pub fn single(var: VariableHandle, dof: usize) -> Self {
        Self {
            var_a: var,
            jac_a: vec![0.0; dof],
            var_b: None,
            jac_b: Vec::new(),
            rhs: 0.0,
            violation: 0.0,
            lambda: 0.0,
            mode: ConstraintMode::Bilateral,
            row: 0,
        }
    }

    /// A row referencing two variable blocks.
    pub fn pair(var_a: VariableHandle, dof_a: usize, var_b: VariableHandle, dof_b: usize) -> Self {
        Self {
            var_a,
            jac_a: vec![0.0; dof_a],
            var_b: Some(var_b),
            jac_b: vec![0.0; dof_b],
            rhs: 0.0,
            violation: 0.0,
            lambda: 0.0,
            mode: ConstraintMode::Bilateral,
            row: 0,
        }
    }

    pub(crate) fn set_row(&mut self, row: usize) {
        self.row = row;
    }

    /// Row index in the global reaction vector for this assembly.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Clears the accumulated right-hand side and violation.
    pub fn bi_reset(&mut self) {
        self.rhs = 0.0;
        self.violation = 0.0;
    }

    /// Loads the positional violation `c`, scaled by `factor`
    /// (typically `1/h`). When `do_clamp` is set, the scaled term is
    /// clamped to `±recovery_clamp`, preserving its sign — large
    /// violations recover at a bounded speed instead of destabilizing
    /// the solve.
    pub fn bi_load_c(&mut self, c: Real, factor: Real, recovery_clamp: Real, do_clamp: bool) {
        self.violation = c;
        let mut term = factor * c;
        if do_clamp {
            term = term.clamp(-recovery_clamp, recovery_clamp);
        }
        self.rhs += term;
    }

    /// Loads the rheonomic (explicitly time-dependent) part of the
    /// velocity constraint, scaled by `factor`.
    pub fn bi_load_ct(&mut self, ct: Real, factor: Real) {
        self.rhs += factor * ct;
    }

    /// The solved multiplier scaled to a physical reaction
    /// (`factor` is typically `1/h`, impulse → force).
    pub fn react(&self, factor: Real) -> Real {
        self.lambda * factor
    }
}
