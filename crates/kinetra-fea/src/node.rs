//! FEA nodes: point and point+direction generalized coordinates.

use kinetra_core::{
    MassOperator, StateDelta, StateDims, StateOwner, StateVector, SystemDescriptor, Updatable,
    VariableHandle, VariableOwner,
};
use kinetra_math::DVec3;
use kinetra_types::{KinetraResult, Real};

/// A 3-DOF point node with lumped mass.
#[derive(Debug, Clone)]
pub struct FeaNodeXyz {
    pub pos: DVec3,
    pub vel: DVec3,
    mass: Real,
    force_accum: DVec3,
    fixed: bool,
    var: Option<VariableHandle>,
}

impl FeaNodeXyz {
    pub fn new(pos: DVec3, mass: Real) -> Self {
        Self {
            pos,
            vel: DVec3::ZERO,
            mass,
            force_accum: DVec3::ZERO,
            fixed: false,
            var: None,
        }
    }

    pub fn mass(&self) -> Real {
        self.mass
    }

    pub fn set_mass(&mut self, mass: Real) {
        self.mass = mass;
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    pub fn apply_force(&mut self, force: DVec3) {
        self.force_accum += force;
    }

    pub fn clear_accumulators(&mut self) {
        self.force_accum = DVec3::ZERO;
    }

    pub fn var_handle(&self) -> Option<VariableHandle> {
        self.var
    }
}

impl StateOwner for FeaNodeXyz {
    fn state_dims(&self) -> StateDims {
        StateDims::new(3, 3)
    }

    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta) {
        x.set_vec3(off_x, self.pos);
        v.set_vec3(off_w, self.vel);
    }

    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta) {
        self.pos = x.vec3(off_x);
        self.vel = v.vec3(off_w);
    }

    fn state_increment(
        &self,
        off_x: usize,
        x_new: &mut StateVector,
        x: &StateVector,
        off_w: usize,
        dx: &StateDelta,
    ) {
        if self.fixed {
            x_new.set_vec3(off_x, x.vec3(off_x));
        } else {
            x_new.set_vec3(off_x, x.vec3(off_x) + dx.vec3(off_w));
        }
    }
}

impl VariableOwner for FeaNodeXyz {
    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor) {
        self.var = if self.fixed {
            None
        } else {
            Some(descriptor.inject_variable(MassOperator::Node { mass: self.mass }))
        };
    }

    fn load_forces(
        &mut self,
        descriptor: &mut SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        if let Some(h) = self.var {
            let f = self.force_accum;
            descriptor
                .variable_mut(h)?
                .load_forces(&[f.x, f.y, f.z], factor);
        }
        Ok(())
    }

    fn load_speeds(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        if let Some(h) = self.var {
            let v = self.vel;
            descriptor.variable_mut(h)?.load_speed(&[v.x, v.y, v.z]);
        }
        Ok(())
    }

    fn fetch_speeds(&mut self, descriptor: &SystemDescriptor) -> KinetraResult<()> {
        if let Some(h) = self.var {
            let qb = &descriptor.variable(h)?.qb;
            self.vel = DVec3::new(qb[0], qb[1], qb[2]);
        }
        Ok(())
    }
}

impl Updatable for FeaNodeXyz {
    fn update(&mut self, _time: Real, _update_assets: bool) {}
}

/// A 6-DOF point + direction node.
///
/// The direction slots are massless by default; they move only through
/// constraints, never through forces. Gradient-based elements that need
/// dynamic directions can assign a small `dir_mass`.
#[derive(Debug, Clone)]
pub struct FeaNodeXyzD {
    pub pos: DVec3,
    pub vel: DVec3,
    /// Direction coordinates (unit length by convention, maintained by
    /// the constraints acting on it).
    pub dir: DVec3,
    pub dir_dt: DVec3,
    mass: Real,
    dir_mass: Real,
    force_accum: DVec3,
    fixed: bool,
    pos_var: Option<VariableHandle>,
    dir_var: Option<VariableHandle>,
}

impl FeaNodeXyzD {
    pub fn new(pos: DVec3, dir: DVec3, mass: Real) -> Self {
        Self {
            pos,
            vel: DVec3::ZERO,
            dir,
            dir_dt: DVec3::ZERO,
            mass,
            dir_mass: 0.0,
            force_accum: DVec3::ZERO,
            fixed: false,
            pos_var: None,
            dir_var: None,
        }
    }

    pub fn mass(&self) -> Real {
        self.mass
    }

    pub fn set_mass(&mut self, mass: Real) {
        self.mass = mass;
    }

    pub fn dir_mass(&self) -> Real {
        self.dir_mass
    }

    pub fn set_dir_mass(&mut self, dir_mass: Real) {
        self.dir_mass = dir_mass;
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    pub fn apply_force(&mut self, force: DVec3) {
        self.force_accum += force;
    }

    pub fn clear_accumulators(&mut self) {
        self.force_accum = DVec3::ZERO;
    }

    pub fn pos_var_handle(&self) -> Option<VariableHandle> {
        self.pos_var
    }

    pub fn dir_var_handle(&self) -> Option<VariableHandle> {
        self.dir_var
    }
}

impl StateOwner for FeaNodeXyzD {
    fn state_dims(&self) -> StateDims {
        StateDims::new(6, 6)
    }

    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta) {
        x.set_vec3(off_x, self.pos);
        x.set_vec3(off_x + 3, self.dir);
        v.set_vec3(off_w, self.vel);
        v.set_vec3(off_w + 3, self.dir_dt);
    }

    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta) {
        self.pos = x.vec3(off_x);
        self.dir = x.vec3(off_x + 3);
        self.vel = v.vec3(off_w);
        self.dir_dt = v.vec3(off_w + 3);
    }

    fn state_increment(
        &self,
        off_x: usize,
        x_new: &mut StateVector,
        x: &StateVector,
        off_w: usize,
        dx: &StateDelta,
    ) {
        if self.fixed {
            x_new.set_vec3(off_x, x.vec3(off_x));
            x_new.set_vec3(off_x + 3, x.vec3(off_x + 3));
            return;
        }
        x_new.set_vec3(off_x, x.vec3(off_x) + dx.vec3(off_w));
        // Direction coordinates are plain vectors, not quaternions.
        x_new.set_vec3(off_x + 3, x.vec3(off_x + 3) + dx.vec3(off_w + 3));
    }
}

impl VariableOwner for FeaNodeXyzD {
    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor) {
        if self.fixed {
            self.pos_var = None;
            self.dir_var = None;
        } else {
            self.pos_var =
                Some(descriptor.inject_variable(MassOperator::Node { mass: self.mass }));
            self.dir_var = Some(descriptor.inject_variable(MassOperator::Node {
                mass: self.dir_mass,
            }));
        }
    }

    fn load_forces(
        &mut self,
        descriptor: &mut SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        if let Some(h) = self.pos_var {
            let f = self.force_accum;
            descriptor
                .variable_mut(h)?
                .load_forces(&[f.x, f.y, f.z], factor);
        }
        Ok(())
    }

    fn load_speeds(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        if let Some(h) = self.pos_var {
            let v = self.vel;
            descriptor.variable_mut(h)?.load_speed(&[v.x, v.y, v.z]);
        }
        if let Some(h) = self.dir_var {
            let d = self.dir_dt;
            descriptor.variable_mut(h)?.load_speed(&[d.x, d.y, d.z]);
        }
        Ok(())
    }

    fn fetch_speeds(&mut self, descriptor: &SystemDescriptor) -> KinetraResult<()> {
        if let Some(h) = self.pos_var {
            let qb = &descriptor.variable(h)?.qb;
            self.vel = DVec3::new(qb[0], qb[1], qb[2]);
        }
        if let Some(h) = self.dir_var {
            let qb = &descriptor.variable(h)?.qb;
            self.dir_dt = DVec3::new(qb[0], qb[1], qb[2]);
        }
        Ok(())
    }
}

impl Updatable for FeaNodeXyzD {
    fn update(&mut self, _time: Real, _update_assets: bool) {}
}
