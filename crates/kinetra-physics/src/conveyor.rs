//! Conveyor: a truss body carrying a moving plate.
//!
//! The belt surface is modeled as a plate rigidly locked to the truss
//! by an internal six-row lock whose X-translation row carries the belt
//! speed as a rheonomic term. The plate is therefore *solved* to move
//! at the belt speed relative to the truss rather than kinematically
//! overridden, so it exchanges correct impulses with anything resting
//! on it. Each update re-seats the plate on the truss top so it never
//! runs off the end.

use kinetra_core::{
    ConstraintOwner, LoadParams, StateDelta, StateDims, StateOwner, StateVector, SystemDescriptor,
    Updatable, VariableOwner,
};
use kinetra_math::{DVec3, Frame};
use kinetra_types::{BodyHandle, KinetraResult, Real};

use crate::body::RigidBody;
use crate::joint::{Joint, JointKind};
use crate::material::ContactMaterial;
use crate::shape::{ShapeGeometry, VisualShape};

const TRUSS: usize = 0;
const PLATE: usize = 1;

/// A conveyor belt surface.
#[derive(Debug, Clone)]
pub struct Conveyor {
    bodies: [RigidBody; 2],
    lock: Joint,
    speed: Real,
    xlength: Real,
    ythick: Real,
    zwidth: Real,
}

fn box_inertia(mass: Real, half: DVec3) -> DVec3 {
    let f = mass / 3.0;
    DVec3::new(
        f * (half.y * half.y + half.z * half.z),
        f * (half.x * half.x + half.z * half.z),
        f * (half.x * half.x + half.y * half.y),
    )
}

impl Conveyor {
    /// Builds a conveyor of the given outer dimensions. The plate gets
    /// a tenth of the mass and rides on the truss top surface.
    pub fn new(mass: Real, xlength: Real, ythick: Real, zwidth: Real) -> Self {
        let half = DVec3::new(xlength / 2.0, ythick / 2.0, zwidth / 2.0);
        let mut truss = RigidBody::new(mass, box_inertia(mass, half));
        truss.add_shape(VisualShape::new(ShapeGeometry::Box { half_extents: half }));

        let plate_mass = mass * 0.1;
        let plate_half = DVec3::new(half.x, half.y * 0.1, half.z);
        let mut plate = RigidBody::new(plate_mass, box_inertia(plate_mass, plate_half));
        plate.set_collide(true);
        plate.set_frame(Frame::from_pos(DVec3::new(0.0, ythick / 2.0, 0.0)));

        let lock = Joint::from_local_frames(
            JointKind::Lock,
            BodyHandle(TRUSS as u32),
            BodyHandle(PLATE as u32),
            Frame::from_pos(DVec3::new(0.0, ythick / 2.0, 0.0)),
            Frame::IDENTITY,
        );

        Self {
            bodies: [truss, plate],
            lock,
            speed: 0.0,
            xlength,
            ythick,
            zwidth,
        }
    }

    pub fn set_conveyor_speed(&mut self, speed: Real) {
        self.speed = speed;
    }

    pub fn conveyor_speed(&self) -> Real {
        self.speed
    }

    pub fn dimensions(&self) -> (Real, Real, Real) {
        (self.xlength, self.ythick, self.zwidth)
    }

    pub fn truss(&self) -> &RigidBody {
        &self.bodies[TRUSS]
    }

    pub fn truss_mut(&mut self) -> &mut RigidBody {
        &mut self.bodies[TRUSS]
    }

    pub fn plate(&self) -> &RigidBody {
        &self.bodies[PLATE]
    }

    pub fn plate_mut(&mut self) -> &mut RigidBody {
        &mut self.bodies[PLATE]
    }

    pub fn plate_material(&self) -> &ContactMaterial {
        &self.bodies[PLATE].material
    }

    pub fn set_plate_material(&mut self, material: ContactMaterial) {
        self.bodies[PLATE].material = material;
    }

    /// Moves the whole conveyor (truss frame; the plate follows at the
    /// next update).
    pub fn set_frame(&mut self, frame: Frame) {
        self.bodies[TRUSS].set_frame(frame);
        self.reseat_plate();
    }

    /// World velocity of the belt surface point above the truss origin.
    pub fn surface_point_velocity(&self) -> DVec3 {
        let top = self.bodies[TRUSS]
            .frame()
            .point_to_parent(DVec3::new(0.0, self.ythick / 2.0, 0.0));
        self.bodies[PLATE].point_velocity(top)
    }

    pub fn apply_gravity(&mut self, gravity: DVec3) {
        for body in &mut self.bodies {
            if body.is_active() {
                body.apply_gravity(gravity);
            }
        }
    }

    pub fn clear_accumulators(&mut self) {
        for body in &mut self.bodies {
            body.clear_accumulators();
        }
    }

    fn reseat_plate(&mut self) {
        let mut seat = self.bodies[TRUSS]
            .frame()
            .compose(&Frame::from_pos(DVec3::new(0.0, self.ythick / 2.0, 0.0)));
        // The plate keeps sliding in the solved state; only its pose is
        // pulled back onto the truss.
        seat.rot = seat.rot.normalize();
        self.bodies[PLATE].set_frame(seat);
    }
}

impl StateOwner for Conveyor {
    fn state_dims(&self) -> StateDims {
        self.bodies[TRUSS].state_dims() + self.bodies[PLATE].state_dims()
    }

    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta) {
        self.bodies[TRUSS].gather_state(off_x, x, off_w, v);
        self.bodies[PLATE].gather_state(off_x + 7, x, off_w + 6, v);
    }

    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta) {
        self.bodies[TRUSS].scatter_state(off_x, x, off_w, v);
        self.bodies[PLATE].scatter_state(off_x + 7, x, off_w + 6, v);
    }

    fn state_increment(
        &self,
        off_x: usize,
        x_new: &mut StateVector,
        x: &StateVector,
        off_w: usize,
        dx: &StateDelta,
    ) {
        self.bodies[TRUSS].state_increment(off_x, x_new, x, off_w, dx);
        self.bodies[PLATE].state_increment(off_x + 7, x_new, x, off_w + 6, dx);
    }
}

impl VariableOwner for Conveyor {
    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor) {
        self.bodies[TRUSS].inject_variables(descriptor);
        self.bodies[PLATE].inject_variables(descriptor);
    }

    fn load_forces(
        &mut self,
        descriptor: &mut SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        self.bodies[TRUSS].load_forces(descriptor, factor)?;
        self.bodies[PLATE].load_forces(descriptor, factor)
    }

    fn load_speeds(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        self.bodies[TRUSS].load_speeds(descriptor)?;
        self.bodies[PLATE].load_speeds(descriptor)
    }

    fn fetch_speeds(&mut self, descriptor: &SystemDescriptor) -> KinetraResult<()> {
        self.bodies[TRUSS].fetch_speeds(descriptor)?;
        self.bodies[PLATE].fetch_speeds(descriptor)
    }
}

impl ConstraintOwner for Conveyor {
    fn constraint_count(&self) -> usize {
        6
    }

    fn inject_constraints(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        self.lock.inject_constraints(descriptor, &self.bodies)
    }

    fn load_constraint_terms(
        &mut self,
        descriptor: &mut SystemDescriptor,
        params: &LoadParams,
    ) -> KinetraResult<()> {
        self.lock
            .load_constraint_terms(descriptor, params, &self.bodies)?;
        // Belt speed enters only here: the X row's rheonomic term makes
        // the solved relative plate velocity equal the belt speed.
        if let Some(h) = self.lock.row_handle(0) {
            descriptor
                .constraint_mut(h)?
                .bi_load_ct(-self.speed, params.ct_factor);
        }
        Ok(())
    }

    fn fetch_reactions(
        &mut self,
        descriptor: &SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        self.lock.fetch_reactions(descriptor, factor)
    }
}

impl Updatable for Conveyor {
    fn update(&mut self, time: Real, update_assets: bool) {
        self.reseat_plate();
        self.bodies[TRUSS].update(time, update_assets);
        self.bodies[PLATE].update(time, update_assets);
    }
}
