//! The state protocol: capability traits a physics item implements to
//! take part in the assembly cycle.
//!
//! Each trait is one capability. A free rigid body implements all of
//! them; a pure coupling (a gear, a joint) owns no state of its own and
//! implements only the constraint side; a motorized element may own
//! state and constraints both. The descriptor is always an explicit
//! parameter, threaded down from the integrator.

use crate::descriptor::SystemDescriptor;
use crate::state::{StateDelta, StateVector};
use kinetra_types::{KinetraResult, Real};

/// Position-level and velocity-level scalar counts of an item (7 and 6
/// for a rigid body, 1 and 1 for a shaft, 3 and 3 for a point node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateDims {
    pub n_x: usize,
    pub n_w: usize,
}

impl StateDims {
    pub const fn new(n_x: usize, n_w: usize) -> Self {
        Self { n_x, n_w }
    }
}

impl std::ops::Add for StateDims {
    type Output = StateDims;
    fn add(self, rhs: StateDims) -> StateDims {
        StateDims::new(self.n_x + rhs.n_x, self.n_w + rhs.n_w)
    }
}

impl std::ops::AddAssign for StateDims {
    fn add_assign(&mut self, rhs: StateDims) {
        self.n_x += rhs.n_x;
        self.n_w += rhs.n_w;
    }
}

/// Scale factors for one assembly load pass.
///
/// For a step of size `h` the integrator uses `force_factor = h`
/// (forces become impulses), `c_factor = 1/h` (positional violations
/// become recovery speeds) and `ct_factor = 1`.
#[derive(Debug, Clone, Copy)]
pub struct LoadParams {
    /// Multiplier applied to applied forces when accumulating `fb`.
    pub force_factor: Real,
    /// Multiplier applied to positional violations `C`.
    pub c_factor: Real,
    /// Bound on the scaled violation term when clamping is enabled.
    pub recovery_clamp: Real,
    /// Whether to clamp the scaled violation term.
    pub do_clamp: bool,
    /// Multiplier applied to rheonomic terms `Ct`.
    pub ct_factor: Real,
}

/// Owns position/velocity state slots in the global buffers.
///
/// Offsets are assigned by the caller walking items in a fixed order;
/// an item reads and writes exactly `state_dims()` scalars at its
/// offsets and nothing else.
pub trait StateOwner {
    fn state_dims(&self) -> StateDims;

    /// Writes current positions into `x` at `off_x` and current speeds
    /// into `v` at `off_w`.
    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta);

    /// Reads positions and speeds back from the buffers.
    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta);

    /// Computes `x_new = x ⊞ dx` for this item's slots. Translational
    /// slots add componentwise; quaternion slots compose with the
    /// exponential of the body-local rotation increment, never add.
    fn state_increment(
        &self,
        off_x: usize,
        x_new: &mut StateVector,
        x: &StateVector,
        off_w: usize,
        dx: &StateDelta,
    );
}

/// Owns one or more variable blocks in the descriptor.
pub trait VariableOwner {
    /// Registers this item's variable blocks, storing the returned
    /// handles for the rest of the cycle.
    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor);

    /// Accumulates applied and gyroscopic forces into `fb`, scaled by
    /// `factor`.
    fn load_forces(&mut self, descriptor: &mut SystemDescriptor, factor: Real)
        -> KinetraResult<()>;

    /// Copies the item's current speed into `qb`.
    fn load_speeds(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()>;

    /// Reads the solved speed back from `qb` into the item.
    fn fetch_speeds(&mut self, descriptor: &SystemDescriptor) -> KinetraResult<()>;
}

/// Owns one or more constraint rows in the descriptor.
pub trait ConstraintOwner {
    /// Number of scalar rows this item contributes when active.
    fn constraint_count(&self) -> usize;

    /// Registers this item's rows with Jacobians already evaluated at
    /// the current configuration.
    fn inject_constraints(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()>;

    /// Loads violation and rheonomic terms into the registered rows.
    fn load_constraint_terms(
        &mut self,
        descriptor: &mut SystemDescriptor,
        params: &LoadParams,
    ) -> KinetraResult<()>;

    /// Reads solved multipliers back, scaled by `factor` into physical
    /// reactions stored on the item.
    fn fetch_reactions(&mut self, descriptor: &SystemDescriptor, factor: Real)
        -> KinetraResult<()>;
}

/// Recomputes configuration-dependent caches after state changes.
pub trait Updatable {
    /// `update_assets` distinguishes the cheap mid-step refresh from the
    /// full end-of-step update that also moves attached visual assets.
    fn update(&mut self, time: Real, update_assets: bool);
}
