//! Linearized implicit Euler stepping.
//!
//! One step: refresh the system at `t`, assemble the velocity-level
//! problem into the descriptor, solve it, write solved speeds and
//! reactions back, then advance positions with the new speeds and run a
//! full update at `t + h`. Quaternion coordinates advance by
//! composition inside `state_increment`, never by componentwise
//! addition.

use crate::descriptor::SystemDescriptor;
use crate::protocol::{LoadParams, StateDims};
use crate::solver::{ConstraintSolver, SolveReport};
use crate::state::{ReactionVec, StateDelta, StateVector};
use kinetra_types::{KinetraError, KinetraResult, Real};

/// The system-level contract the integrator drives.
///
/// A container of physics items implements this by delegating to its
/// items' capability traits in a fixed order, so offsets match between
/// the gather and scatter halves of a step.
pub trait Integrable {
    /// Total position-level and velocity-level scalar counts.
    fn state_dims(&self) -> StateDims;

    /// Recomputes configuration-dependent caches at `time`.
    fn update(&mut self, time: Real, update_assets: bool);

    /// Injects every active item's variable and constraint blocks.
    fn inject(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()>;

    /// Loads forces, speeds, violations and rheonomic terms.
    fn load(&mut self, descriptor: &mut SystemDescriptor, params: &LoadParams)
        -> KinetraResult<()>;

    /// Writes solved speeds back into items and converts multipliers to
    /// reactions with `react_factor`.
    fn apply_solution(
        &mut self,
        descriptor: &SystemDescriptor,
        react_factor: Real,
    ) -> KinetraResult<()>;

    /// Gathers current positions and speeds into flat buffers.
    fn gather_state(&self, x: &mut StateVector, v: &mut StateDelta);

    /// Scatters positions and speeds back into items.
    fn scatter_state(&mut self, x: &StateVector, v: &StateDelta) -> KinetraResult<()>;

    /// Computes `x_new = x ⊞ dx` item by item.
    fn state_increment(&self, x_new: &mut StateVector, x: &StateVector, dx: &StateDelta);
}

/// Diagnostics from one completed step.
#[derive(Debug, Clone, Copy)]
pub struct StepResult {
    /// Time at the end of the step.
    pub t_end: Real,
    pub solve: SolveReport,
}

/// First-order linearized implicit Euler.
///
/// The velocity update solves the constrained impulse problem once per
/// step (no Newton loop); the position update is explicit in the new
/// speeds. Constraint drift is absorbed by the clamped `C/h`
/// stabilization term rather than a separate projection pass.
#[derive(Debug)]
pub struct EulerImplicitLinearized {
    /// Bound on per-row violation recovery speed.
    pub recovery_clamp: Real,
    /// Disable to reproduce unclamped stabilization.
    pub use_clamping: bool,
    /// Seed each solve with the previous step's multipliers when the
    /// row count is unchanged.
    pub warm_start: bool,
    descriptor: SystemDescriptor,
    reactions: ReactionVec,
}

impl EulerImplicitLinearized {
    pub fn new() -> Self {
        Self {
            recovery_clamp: kinetra_types::constants::DEFAULT_RECOVERY_CLAMP,
            use_clamping: true,
            warm_start: true,
            descriptor: SystemDescriptor::new(),
            reactions: ReactionVec::zeros(0),
        }
    }

    /// The descriptor used for the most recent assembly, for
    /// inspection after a step.
    pub fn descriptor(&self) -> &SystemDescriptor {
        &self.descriptor
    }

    /// Advances `system` from `t` to `t + h`.
    pub fn advance<S, C>(
        &mut self,
        system: &mut S,
        solver: &mut C,
        t: Real,
        h: Real,
    ) -> KinetraResult<StepResult>
    where
        S: Integrable,
        C: ConstraintSolver,
    {
        if h <= 0.0 {
            return Err(KinetraError::InvalidConfig(format!(
                "non-positive timestep {h}"
            )));
        }
        let inv_h = 1.0 / h;

        system.update(t, false);

        self.descriptor.begin_assembly();
        system.inject(&mut self.descriptor)?;
        system.load(
            &mut self.descriptor,
            &LoadParams {
                force_factor: h,
                c_factor: inv_h,
                recovery_clamp: self.recovery_clamp,
                do_clamp: self.use_clamping,
                ct_factor: 1.0,
            },
        )?;

        // Same row count as last step means the same constraint set in
        // the same injection order, so last step's impulses are a good
        // first iterate.
        if self.warm_start && self.reactions.len() == self.descriptor.n_constraints() {
            self.descriptor.scatter_reactions(&self.reactions);
        }

        let report = solver.solve(&mut self.descriptor)?;

        if self.reactions.len() != self.descriptor.n_constraints() {
            self.reactions = ReactionVec::zeros(self.descriptor.n_constraints());
        }
        self.descriptor.gather_reactions(&mut self.reactions);

        // Multipliers are impulses; 1/h turns them into forces.
        system.apply_solution(&self.descriptor, inv_h)?;

        let dims = system.state_dims();
        let mut x = StateVector::zeros(dims.n_x);
        let mut x_new = StateVector::zeros(dims.n_x);
        let mut v = StateDelta::zeros(dims.n_w);
        system.gather_state(&mut x, &mut v);
        system.state_increment(&mut x_new, &x, &v.scaled(h));
        system.scatter_state(&x_new, &v)?;

        system.update(t + h, true);

        Ok(StepResult {
            t_end: t + h,
            solve: report,
        })
    }
}

impl Default for EulerImplicitLinearized {
    fn default() -> Self {
        Self::new()
    }
}
