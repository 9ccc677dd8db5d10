//! Global state vectors for the assembly cycle.
//!
//! Items gather into and scatter from these flat buffers at their
//! assigned offsets. Position-level and velocity-level dimensions differ
//! per item when quaternions are used (7 vs 6 for a rigid body), so the
//! buffers are separate types and never mixed.

use kinetra_math::{DQuat, DVec3};
use kinetra_types::Real;

/// Position-level state: per-item blocks of 3 (translation), 4
/// (quaternion, stored w-first), or 1 (shaft angle) scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    data: Vec<Real>,
}

/// Velocity-level state (or state delta): per-item blocks of 3+3 for a
/// rigid body (linear velocity, body-local angular velocity), 1 for a
/// shaft, 3 for a point node.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDelta {
    data: Vec<Real>,
}

/// Lagrange-multiplier vector: one slot per scalar constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionVec {
    data: Vec<Real>,
}

macro_rules! impl_flat_buffer {
    ($name:ident) => {
        impl $name {
            /// Creates a zeroed buffer of length `n`.
            pub fn zeros(n: usize) -> Self {
                Self { data: vec![0.0; n] }
            }

            pub fn len(&self) -> usize {
                self.data.len()
            }

            pub fn is_empty(&self) -> bool {
                self.data.is_empty()
            }

            pub fn as_slice(&self) -> &[Real] {
                &self.data
            }

            pub fn as_mut_slice(&mut self) -> &mut [Real] {
                &mut self.data
            }

            #[inline]
            pub fn get(&self, i: usize) -> Real {
                self.data[i]
            }

            #[inline]
            pub fn set(&mut self, i: usize, v: Real) {
                self.data[i] = v;
            }

            /// Reads a 3-vector starting at `off`.
            #[inline]
            pub fn vec3(&self, off: usize) -> DVec3 {
                DVec3::new(self.data[off], self.data[off + 1], self.data[off + 2])
            }

            /// Writes a 3-vector starting at `off`.
            #[inline]
            pub fn set_vec3(&mut self, off: usize, v: DVec3) {
                self.data[off] = v.x;
                self.data[off + 1] = v.y;
                self.data[off + 2] = v.z;
            }
        }

        impl std::ops::Index<usize> for $name {
            type Output = Real;
            fn index(&self, i: usize) -> &Real {
                &self.data[i]
            }
        }

        impl std::ops::IndexMut<usize> for $name {
            fn index_mut(&mut self, i: usize) -> &mut Real {
                &mut self.data[i]
            }
        }
    };
}

impl_flat_buffer!(StateVector);
impl_flat_buffer!(StateDelta);
impl_flat_buffer!(ReactionVec);

impl StateVector {
    /// Reads a quaternion stored w-first at `off`.
    #[inline]
    pub fn quat(&self, off: usize) -> DQuat {
        DQuat::from_xyzw(
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
            self.data[off],
        )
    }

    /// Writes a quaternion w-first at `off`.
    #[inline]
    pub fn set_quat(&mut self, off: usize, q: DQuat) {
        self.data[off] = q.w;
        self.data[off + 1] = q.x;
        self.data[off + 2] = q.y;
        self.data[off + 3] = q.z;
    }
}

impl StateDelta {
    /// Returns a copy with every entry scaled by `factor` (typically the
    /// timestep, turning speeds into increments).
    pub fn scaled(&self, factor: Real) -> StateDelta {
        StateDelta {
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }
}
