//! Variable blocks: the per-entity generalized-coordinate unit the
//! solver operates on.
//!
//! A block owns a mass operator, a force accumulator `fb`, and a solver
//! speed buffer `qb`. Blocks are transient: they are created by an
//! injection call each assembly cycle and are only addressable through
//! the handle returned by that call.

use kinetra_math::DVec3;
use kinetra_types::Real;

/// Diagonal mass/inertia operator of a variable block.
///
/// The operator may be singular: a zero mass or inertia entry marks a
/// kinematic coordinate. Its inverse is treated as zero, so forces never
/// move the coordinate and the solver sees a rank-deficient operator it
/// must tolerate (regularization on the solver side, not an error).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MassOperator {
    /// 6-DOF rigid body: scalar mass and body-local diagonal inertia.
    Body { mass: Real, inertia: DVec3 },
    /// 1-DOF rotational node.
    Shaft { inertia: Real },
    /// 3-DOF point node (FEA node position or direction slots).
    Node { mass: Real },
}

impl MassOperator {
    /// Velocity-level DOF count of the block.
    pub fn dof_w(&self) -> usize {
        match self {
            MassOperator::Body { .. } => 6,
            MassOperator::Shaft { .. } => 1,
            MassOperator::Node { .. } => 3,
        }
    }

    /// Inverse of the k-th diagonal entry; zero where the operator is
    /// singular.
    #[inline]
    pub fn inv_entry(&self, k: usize) -> Real {
        let m = match *self {
            MassOperator::Body { mass, inertia } => {
                if k < 3 {
                    mass
                } else {
                    inertia[k - 3]
                }
            }
            MassOperator::Shaft { inertia } => inertia,
            MassOperator::Node { mass } => mass,
        };
        if m > 0.0 {
            1.0 / m
        } else {
            0.0
        }
    }

    /// The k-th diagonal entry itself.
    #[inline]
    pub fn entry(&self, k: usize) -> Real {
        match *self {
            MassOperator::Body { mass, inertia } => {
                if k < 3 {
                    mass
                } else {
                    inertia[k - 3]
                }
            }
            MassOperator::Shaft { inertia } => inertia,
            MassOperator::Node { mass } => mass,
        }
    }
}

/// A per-entity generalized-coordinate block registered with the system
/// descriptor for one assembly cycle.
#[derive(Debug, Clone)]
pub struct VariableBlock {
    /// Mass/inertia operator (possibly singular).
    pub mass: MassOperator,
    /// Force accumulator (impulse units after scaling by the timestep).
    pub fb: Vec<Real>,
    /// Solver-visible speed buffer: loaded with the current speed, then
    /// overwritten by the solved speed.
    pub qb: Vec<Real>,
    /// Offset into the global velocity-delta vector, assigned
    /// contiguously at injection. Valid only for the current assembly.
    offset: usize,
}

impl VariableBlock {
    pub(crate) fn new(mass: MassOperator, offset: usize) -> Self {
        let n = mass.dof_w();
        Self {
            mass,
            fb: vec![0.0; n],
            qb: vec![0.0; n],
            offset,
        }
    }

    /// Velocity-level DOF count.
    pub fn dof_w(&self) -> usize {
        self.mass.dof_w()
    }

    /// Offset into the global velocity-delta vector for this assembly.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Zeroes the force accumulator.
    pub fn reset_forces(&mut self) {
        self.fb.iter_mut().for_each(|f| *f = 0.0);
    }

    /// Accumulates `factor * forces` into `fb`.
    pub fn load_forces(&mut self, forces: &[Real], factor: Real) {
        debug_assert_eq!(forces.len(), self.fb.len());
        for (fb, f) in self.fb.iter_mut().zip(forces) {
            *fb += factor * f;
        }
    }

    /// Loads the entity's current speed into `qb`.
    pub fn load_speed(&mut self, speed: &[Real]) {
        debug_assert_eq!(speed.len(), self.qb.len());
        self.qb.copy_from_slice(speed);
    }

    /// Folds accumulated forces into the speed buffer:
    /// `qb += M⁻¹ fb`. Singular entries contribute nothing, so a
    /// kinematic block keeps its loaded speed.
    pub fn increment_from_forces(&mut self) {
        for k in 0..self.qb.len() {
            self.qb[k] += self.mass.inv_entry(k) * self.fb[k];
        }
    }
}
