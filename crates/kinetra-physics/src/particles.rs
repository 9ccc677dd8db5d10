//! Particle clusters: many clone bodies sharing one mass operator and
//! one shape.
//!
//! Every particle is a full 7/6-DOF rigid state, but mass, inertia,
//! material, and the visual/collision shape are defined once on the
//! cluster. The shared mass values are stamped into each particle's
//! variable block at injection, so editing the cluster mass between
//! steps affects all particles uniformly.

use kinetra_core::{
    MassOperator, StateDelta, StateDims, StateOwner, StateVector, SystemDescriptor, Updatable,
    VariableHandle, VariableOwner,
};
use kinetra_math::{rotation, DVec3, Frame};
use kinetra_types::{KinetraResult, Real};

use crate::body::SpeedLimit;
use crate::material::ContactMaterial;
use crate::shape::VisualShape;

/// One clone particle's own state.
#[derive(Debug, Clone)]
pub struct Particle {
    pub frame: Frame,
    pub lin_vel: DVec3,
    pub ang_vel_local: DVec3,
    var: Option<VariableHandle>,
}

impl Particle {
    fn at(frame: Frame) -> Self {
        Self {
            frame,
            lin_vel: DVec3::ZERO,
            ang_vel_local: DVec3::ZERO,
            var: None,
        }
    }
}

/// A set of clone particles.
#[derive(Debug, Clone)]
pub struct ParticleCluster {
    pub id: u32,
    mass: Real,
    inertia: DVec3,
    pub material: ContactMaterial,
    shape: Option<VisualShape>,
    particles: Vec<Particle>,
    /// Cluster-wide force applied to every particle, cleared after each
    /// load.
    pending_force: DVec3,
    pub speed_limit: Option<SpeedLimit>,
}

impl ParticleCluster {
    pub fn new(mass: Real, inertia: DVec3) -> Self {
        Self {
            id: 0,
            mass,
            inertia,
            material: ContactMaterial::default(),
            shape: None,
            particles: Vec::new(),
            pending_force: DVec3::ZERO,
            speed_limit: None,
        }
    }

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

    pub fn shape(&self) -> Option<&VisualShape> {
        self.shape.as_ref()
    }

    pub fn set_shape(&mut self, shape: VisualShape) {
        self.shape = Some(shape);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn add_particle(&mut self, frame: Frame) {
        self.particles.push(Particle::at(frame));
    }

    /// Grows or shrinks the cluster; new particles appear at the
    /// origin.
    pub fn resize(&mut self, count: usize) {
        self.particles
            .resize_with(count, || Particle::at(Frame::IDENTITY));
    }

    /// Accumulates a force applied to every particle at its mass
    /// center (gravity, wind fields).
    pub fn apply_force_all(&mut self, force: DVec3) {
        self.pending_force += force;
    }

    pub fn clear_accumulators(&mut self) {
        self.pending_force = DVec3::ZERO;
    }
}

impl StateOwner for ParticleCluster {
    fn state_dims(&self) -> StateDims {
        StateDims::new(7 * self.particles.len(), 6 * self.particles.len())
    }

    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta) {
        for (i, p) in self.particles.iter().enumerate() {
            let ox = off_x + 7 * i;
            let ow = off_w + 6 * i;
            x.set_vec3(ox, p.frame.pos);
            x.set_quat(ox + 3, p.frame.rot);
            v.set_vec3(ow, p.lin_vel);
            v.set_vec3(ow + 3, p.ang_vel_local);
        }
    }

    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta) {
        for (i, p) in self.particles.iter_mut().enumerate() {
            let ox = off_x + 7 * i;
            let ow = off_w + 6 * i;
            p.frame.pos = x.vec3(ox);
            p.frame.rot = x.quat(ox + 3).normalize();
            p.lin_vel = v.vec3(ow);
            p.ang_vel_local = v.vec3(ow + 3);
        }
    }

    fn state_increment(
        &self,
        off_x: usize,
        x_new: &mut StateVector,
        x: &StateVector,
        off_w: usize,
        dx: &StateDelta,
    ) {
        for i in 0..self.particles.len() {
            let ox = off_x + 7 * i;
            let ow = off_w + 6 * i;
            x_new.set_vec3(ox, x.vec3(ox) + dx.vec3(ow));
            let q = rotation::increment_rotation(x.quat(ox + 3), dx.vec3(ow + 3));
            x_new.set_quat(ox + 3, q);
        }
    }
}

impl VariableOwner for ParticleCluster {
    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor) {
        // Shared mass stamped per particle at injection time.
        let op = MassOperator::Body {
            mass: self.mass,
            inertia: self.inertia,
        };
        for p in &mut self.particles {
            p.var = Some(descriptor.inject_variable(op));
        }
    }

    fn load_forces(
        &mut self,
        descriptor: &mut SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        let f = self.pending_force;
        for p in &self.particles {
            if let Some(h) = p.var {
                let w = p.ang_vel_local;
                let gyro = -w.cross(self.inertia * w);
                descriptor
                    .variable_mut(h)?
                    .load_forces(&[f.x, f.y, f.z, gyro.x, gyro.y, gyro.z], factor);
            }
        }
        Ok(())
    }

    fn load_speeds(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        for p in &self.particles {
            if let Some(h) = p.var {
                let v = p.lin_vel;
                let w = p.ang_vel_local;
                descriptor
                    .variable_mut(h)?
                    .load_speed(&[v.x, v.y, v.z, w.x, w.y, w.z]);
            }
        }
        Ok(())
    }

    fn fetch_speeds(&mut self, descriptor: &SystemDescriptor) -> KinetraResult<()> {
        for p in &mut self.particles {
            if let Some(h) = p.var {
                let qb = &descriptor.variable(h)?.qb;
                p.lin_vel = DVec3::new(qb[0], qb[1], qb[2]);
                p.ang_vel_local = DVec3::new(qb[3], qb[4], qb[5]);
            }
        }
        Ok(())
    }
}

impl Updatable for ParticleCluster {
    fn update(&mut self, _time: Real, _update_assets: bool) {
        if let Some(limit) = self.speed_limit {
            for p in &mut self.particles {
                let lv = p.lin_vel.length();
                if lv > limit.max_linear {
                    p.lin_vel *= limit.max_linear / lv;
                }
                let av = p.ang_vel_local.length();
                if av > limit.max_angular {
                    p.ang_vel_local *= limit.max_angular / av;
                }
            }
        }
    }
}
