//! Rigid body: 7 position-level, 6 velocity-level coordinates.
//!
//! Orientation is a unit quaternion; angular velocity is body-local.
//! A fixed or sleeping body injects no variable block and is skipped by
//! the solver entirely, which is how kinematic scenery participates in
//! joints (single-sided rows) without a mass operator.

use serde::{Deserialize, Serialize};

use kinetra_core::{
    MassOperator, StateDelta, StateDims, StateOwner, StateVector, SystemDescriptor, Updatable,
    VariableHandle, VariableOwner,
};
use kinetra_math::{rotation, DVec3, Frame};
use kinetra_types::{KinetraResult, Real};

use crate::material::ContactMaterial;
use crate::shape::VisualShape;

/// Hard caps on body speed, applied at each update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimit {
    pub max_linear: Real,
    pub max_angular: Real,
}

/// Sleeping thresholds: a body still for `min_still_time` seconds is
/// put to sleep and stops injecting variables until woken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepParams {
    pub min_speed: Real,
    pub min_ang_speed: Real,
    pub min_still_time: Real,
}

/// A 6-DOF rigid body with diagonal body-frame inertia.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub id: u32,
    frame: Frame,
    lin_vel: DVec3,
    ang_vel_local: DVec3,
    mass: Real,
    inertia: DVec3,
    fixed: bool,
    collide: bool,
    pub family_group: u32,
    pub family_mask: u32,
    pub material: ContactMaterial,
    shapes: Vec<VisualShape>,
    // World-space force at the mass center, body-local torque.
    force_accum: DVec3,
    torque_accum: DVec3,
    pub speed_limit: Option<SpeedLimit>,
    pub sleep_params: Option<SleepParams>,
    sleeping: bool,
    still_since: Option<Real>,
    asset_frames: Vec<Frame>,
    var: Option<VariableHandle>,
}

impl RigidBody {
    pub fn new(mass: Real, inertia: DVec3) -> Self {
        Self {
            id: 0,
            frame: Frame::IDENTITY,
            lin_vel: DVec3::ZERO,
            ang_vel_local: DVec3::ZERO,
            mass,
            inertia,
            fixed: false,
            collide: true,
            family_group: 1,
            family_mask: u32::MAX,
            material: ContactMaterial::default(),
            shapes: Vec::new(),
            force_accum: DVec3::ZERO,
            torque_accum: DVec3::ZERO,
            speed_limit: None,
            sleep_params: None,
            sleeping: false,
            still_since: None,
            asset_frames: Vec::new(),
            var: None,
        }
    }

    // ─── frame and velocity ───

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    pub fn pos(&self) -> DVec3 {
        self.frame.pos
    }

    pub fn set_pos(&mut self, pos: DVec3) {
        self.frame.pos = pos;
    }

    pub fn lin_vel(&self) -> DVec3 {
        self.lin_vel
    }

    pub fn set_lin_vel(&mut self, v: DVec3) {
        self.lin_vel = v;
    }

    /// Angular velocity in the body frame.
    pub fn ang_vel_local(&self) -> DVec3 {
        self.ang_vel_local
    }

    pub fn set_ang_vel_local(&mut self, w: DVec3) {
        self.ang_vel_local = w;
    }

    /// Angular velocity in world coordinates.
    pub fn ang_vel_world(&self) -> DVec3 {
        self.frame.dir_to_parent(self.ang_vel_local)
    }

    /// World velocity of a point rigidly attached to the body.
    pub fn point_velocity(&self, world_point: DVec3) -> DVec3 {
        kinetra_math::frame::point_velocity(
            self.lin_vel,
            self.ang_vel_world(),
            world_point - self.frame.pos,
        )
    }

    // ─── mass properties and flags ───

    pub fn mass(&self) -> Real {
        self.mass
    }

    pub fn set_mass(&mut self, mass: Real) {
        self.mass = mass;
    }

    pub fn inertia(&self) -> DVec3 {
        self.inertia
    }

    pub fn set_inertia(&mut self, inertia: DVec3) {
        self.inertia = inertia;
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    pub fn is_collide(&self) -> bool {
        self.collide
    }

    pub fn set_collide(&mut self, collide: bool) {
        self.collide = collide;
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Active bodies inject variables; fixed and sleeping bodies do not.
    pub fn is_active(&self) -> bool {
        !self.fixed && !self.sleeping
    }

    pub fn wake(&mut self) {
        self.sleeping = false;
        self.still_since = None;
    }

    // ─── force accumulation ───

    /// Adds a world-space force through the mass center.
    pub fn apply_force(&mut self, force: DVec3) {
        self.force_accum += force;
        self.wake();
    }

    /// Adds the weight force without waking. Gravity acts every step;
    /// waking on it would keep a still body from ever sleeping.
    pub fn apply_gravity(&mut self, gravity: DVec3) {
        self.force_accum += gravity * self.mass;
    }

    /// Adds a body-local torque.
    pub fn apply_torque_local(&mut self, torque: DVec3) {
        self.torque_accum += torque;
        self.wake();
    }

    /// Adds a world-space force acting at a world-space point.
    pub fn apply_force_at_point(&mut self, force: DVec3, world_point: DVec3) {
        self.force_accum += force;
        let r = world_point - self.frame.pos;
        self.torque_accum += self.frame.dir_to_local(r.cross(force));
        self.wake();
    }

    pub fn clear_accumulators(&mut self) {
        self.force_accum = DVec3::ZERO;
        self.torque_accum = DVec3::ZERO;
    }

    pub fn accumulated_force(&self) -> DVec3 {
        self.force_accum
    }

    pub fn accumulated_torque_local(&self) -> DVec3 {
        self.torque_accum
    }

    // ─── shapes ───

    pub fn add_shape(&mut self, shape: VisualShape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[VisualShape] {
        &self.shapes
    }

    /// Cached world placements of the shapes, refreshed by
    /// `update(time, true)`.
    pub fn asset_frames(&self) -> &[Frame] {
        &self.asset_frames
    }

    /// Variable handle for the current assembly, `None` when inactive.
    pub fn var_handle(&self) -> Option<VariableHandle> {
        self.var
    }

    /// Quaternion time derivative of the current rotational state, in
    /// w-first storage order. Written to checkpoints.
    pub fn quat_derivative(&self) -> [Real; 4] {
        rotation::quat_derivative(self.frame.rot, self.ang_vel_local)
    }

    fn gyroscopic_torque(&self) -> DVec3 {
        let w = self.ang_vel_local;
        -w.cross(self.inertia * w)
    }
}

impl StateOwner for RigidBody {
    fn state_dims(&self) -> StateDims {
        StateDims::new(7, 6)
    }

    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta) {
        x.set_vec3(off_x, self.frame.pos);
        x.set_quat(off_x + 3, self.frame.rot);
        v.set_vec3(off_w, self.lin_vel);
        v.set_vec3(off_w + 3, self.ang_vel_local);
    }

    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta) {
        self.frame.pos = x.vec3(off_x);
        self.frame.rot = x.quat(off_x + 3).normalize();
        self.lin_vel = v.vec3(off_w);
        self.ang_vel_local = v.vec3(off_w + 3);
    }

    fn state_increment(
        &self,
        off_x: usize,
        x_new: &mut StateVector,
        x: &StateVector,
        off_w: usize,
        dx: &StateDelta,
    ) {
        if !self.is_active() {
            x_new.set_vec3(off_x, x.vec3(off_x));
            x_new.set_quat(off_x + 3, x.quat(off_x + 3));
            return;
        }
        x_new.set_vec3(off_x, x.vec3(off_x) + dx.vec3(off_w));
        let q = rotation::increment_rotation(x.quat(off_x + 3), dx.vec3(off_w + 3));
        x_new.set_quat(off_x + 3, q);
    }
}

impl VariableOwner for RigidBody {
    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor) {
        self.var = if self.is_active() {
            Some(descriptor.inject_variable(MassOperator::Body {
                mass: self.mass,
                inertia: self.inertia,
            }))
        } else {
            None
        };
    }

    fn load_forces(
        &mut self,
        descriptor: &mut SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        if let Some(h) = self.var {
            let f = self.force_accum;
            let t = self.torque_accum + self.gyroscopic_torque();
            descriptor
                .variable_mut(h)?
                .load_forces(&[f.x, f.y, f.z, t.x, t.y, t.z], factor);
        }
        Ok(())
    }

    fn load_speeds(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        if let Some(h) = self.var {
            let v = self.lin_vel;
            let w = self.ang_vel_local;
            descriptor
                .variable_mut(h)?
                .load_speed(&[v.x, v.y, v.z, w.x, w.y, w.z]);
        }
        Ok(())
    }

    fn fetch_speeds(&mut self, descriptor: &SystemDescriptor) -> KinetraResult<()> {
        if let Some(h) = self.var {
            let qb = &descriptor.variable(h)?.qb;
            self.lin_vel = DVec3::new(qb[0], qb[1], qb[2]);
            self.ang_vel_local = DVec3::new(qb[3], qb[4], qb[5]);
        }
        Ok(())
    }
}

impl Updatable for RigidBody {
    fn update(&mut self, time: Real, update_assets: bool) {
        if let Some(limit) = self.speed_limit {
            let lv = self.lin_vel.length();
            if lv > limit.max_linear {
                self.lin_vel *= limit.max_linear / lv;
            }
            let av = self.ang_vel_local.length();
            if av > limit.max_angular {
                self.ang_vel_local *= limit.max_angular / av;
            }
        }

        if let Some(sleep) = self.sleep_params {
            if !self.fixed
                && self.lin_vel.length() < sleep.min_speed
                && self.ang_vel_local.length() < sleep.min_ang_speed
            {
                let since = *self.still_since.get_or_insert(time);
                if time - since >= sleep.min_still_time {
                    self.sleeping = true;
                }
            } else {
                self.still_since = None;
            }
        }

        if update_assets {
            self.asset_frames = self
                .shapes
                .iter()
                .map(|s| s.world_pose(&self.frame))
                .collect();
        }
    }
}
