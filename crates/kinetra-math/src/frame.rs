//! Rigid coordinate frame: a position plus a unit quaternion.
//!
//! This is the coordinate type for body origins, joint markers, and
//! visual-asset placement. Composition follows the parent-child
//! convention: `parent.compose(&child)` places `child` (expressed in
//! `parent` coordinates) in the parent's parent frame.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::rotation;
use kinetra_types::Real;

/// A rigid transform: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Origin position in parent coordinates.
    pub pos: DVec3,
    /// Orientation as a unit quaternion.
    pub rot: DQuat,
}

impl Frame {
    /// The identity frame.
    pub const IDENTITY: Frame = Frame {
        pos: DVec3::ZERO,
        rot: DQuat::IDENTITY,
    };

    /// Creates a frame from a position and rotation.
    pub fn new(pos: DVec3, rot: DQuat) -> Self {
        Self { pos, rot }
    }

    /// Creates a frame at the given position with identity rotation.
    pub fn from_pos(pos: DVec3) -> Self {
        Self {
            pos,
            rot: DQuat::IDENTITY,
        }
    }

    /// Transforms a point from this frame's local coordinates to parent
    /// coordinates.
    #[inline]
    pub fn point_to_parent(&self, local: DVec3) -> DVec3 {
        self.pos + self.rot * local
    }

    /// Transforms a point from parent coordinates into this frame.
    #[inline]
    pub fn point_to_local(&self, parent: DVec3) -> DVec3 {
        self.rot.conjugate() * (parent - self.pos)
    }

    /// Rotates a direction from local to parent coordinates.
    #[inline]
    pub fn dir_to_parent(&self, local: DVec3) -> DVec3 {
        self.rot * local
    }

    /// Rotates a direction from parent coordinates into this frame.
    #[inline]
    pub fn dir_to_local(&self, parent: DVec3) -> DVec3 {
        self.rot.conjugate() * parent
    }

    /// Composes this frame with a child frame expressed in this frame's
    /// coordinates.
    pub fn compose(&self, child: &Frame) -> Frame {
        Frame {
            pos: self.point_to_parent(child.pos),
            rot: (self.rot * child.rot).normalize(),
        }
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Frame {
        let inv_rot = self.rot.conjugate();
        Frame {
            pos: inv_rot * (-self.pos),
            rot: inv_rot,
        }
    }

    /// This frame's X axis expressed in parent coordinates.
    #[inline]
    pub fn x_axis(&self) -> DVec3 {
        self.rot * DVec3::X
    }

    /// This frame's Y axis expressed in parent coordinates.
    #[inline]
    pub fn y_axis(&self) -> DVec3 {
        self.rot * DVec3::Y
    }

    /// This frame's Z axis expressed in parent coordinates.
    #[inline]
    pub fn z_axis(&self) -> DVec3 {
        self.rot * DVec3::Z
    }

    /// Advances the frame by a linear displacement and a local rotation
    /// vector. The rotational part composes quaternions; it is never a
    /// component-wise addition.
    pub fn increment(&self, dpos: DVec3, rot_vec_local: DVec3) -> Frame {
        Frame {
            pos: self.pos + dpos,
            rot: rotation::increment_rotation(self.rot, rot_vec_local),
        }
    }

    /// Builds a frame whose X axis points along `dir` (parent
    /// coordinates). The remaining axes are an arbitrary but stable
    /// orthonormal completion. Used for measuring direction constraints.
    pub fn from_x_axis(pos: DVec3, dir: DVec3) -> Frame {
        let x = dir.normalize_or_zero();
        if x == DVec3::ZERO {
            return Frame::from_pos(pos);
        }
        // Pick the seed axis least aligned with x.
        let seed = if x.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
        let z = x.cross(seed).normalize();
        let y = z.cross(x);
        let rot = DQuat::from_mat3(&glam::DMat3::from_cols(x, y, z)).normalize();
        Frame { pos, rot }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Linear velocity of a point rigidly attached to a moving frame.
///
/// `r` is the world-space vector from the frame origin to the point,
/// `omega_world` the world-space angular velocity.
#[inline]
pub fn point_velocity(linear: DVec3, omega_world: DVec3, r: DVec3) -> DVec3 {
    linear + omega_world.cross(r)
}

/// Small helper for scalar comparisons in frame math.
#[inline]
pub fn approx_eq(a: Real, b: Real, tol: Real) -> bool {
    (a - b).abs() <= tol
}
