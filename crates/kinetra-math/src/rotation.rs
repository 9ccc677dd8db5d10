//! Quaternion helpers for rotational state integration.
//!
//! Rotational DOFs are parameterized by unit quaternions at the position
//! level and by body-local angular velocities at the velocity level.
//! Position increments therefore compose quaternions; the helpers here
//! keep that rule in one place.

use glam::{DQuat, DVec3};

use kinetra_types::constants::EPSILON;
use kinetra_types::Real;

/// Composes a rotation increment onto `q`.
///
/// `rot_vec_local` is an angle-axis rotation vector expressed in the
/// body-local frame (typically `omega_local * dt`).
pub fn increment_rotation(q: DQuat, rot_vec_local: DVec3) -> DQuat {
    let angle = rot_vec_local.length();
    if angle < EPSILON {
        return q;
    }
    let axis = rot_vec_local / angle;
    (q * DQuat::from_axis_angle(axis, angle)).normalize()
}

/// Quaternion time derivative for a body-local angular velocity:
/// `q̇ = ½ q ⊗ (0, ω_local)`.
pub fn quat_derivative(q: DQuat, omega_local: DVec3) -> [Real; 4] {
    let w = DQuat::from_xyzw(omega_local.x, omega_local.y, omega_local.z, 0.0);
    let dq = q * w;
    [0.5 * dq.w, 0.5 * dq.x, 0.5 * dq.y, 0.5 * dq.z]
}

/// Recovers the body-local angular velocity from a quaternion
/// derivative: `ω_local = 2 (q* ⊗ q̇)_xyz`.
pub fn angular_velocity_from_derivative(q: DQuat, dq: [Real; 4]) -> DVec3 {
    let dqq = DQuat::from_xyzw(dq[1], dq[2], dq[3], dq[0]);
    let w = q.conjugate() * dqq;
    2.0 * DVec3::new(w.x, w.y, w.z)
}

/// Small-angle rotation residual between two orientations, expressed in
/// the frame of `qa`: `2 (qa* ⊗ qb)_xyz`, sign-corrected so the
/// residual vanishes when the orientations coincide.
pub fn rotation_residual(qa: DQuat, qb: DQuat) -> DVec3 {
    let mut rel = qa.conjugate() * qb;
    if rel.w < 0.0 {
        rel = -rel;
    }
    2.0 * DVec3::new(rel.x, rel.y, rel.z)
}

/// Rotation angle about the Z axis of the relative orientation
/// `qa* ⊗ qb`. Used by the screw coupling (`z = tau * alpha`).
pub fn relative_z_angle(qa: DQuat, qb: DQuat) -> Real {
    let mut rel = qa.conjugate() * qb;
    if rel.w < 0.0 {
        rel = -rel;
    }
    2.0 * rel.z.atan2(rel.w)
}
