//! Shaft: a single rotational degree of freedom.
//!
//! Shafts are abstract 1-DOF nodes used to model powertrains without
//! full 3D bodies. Couplings between shafts (gears) reference them
//! through arena handles.

use kinetra_core::{
    MassOperator, StateDelta, StateDims, StateOwner, StateVector, SystemDescriptor, Updatable,
    VariableHandle, VariableOwner,
};
use kinetra_types::{KinetraResult, Real};

/// A 1-DOF rotational node with scalar inertia.
#[derive(Debug, Clone)]
pub struct Shaft {
    pub id: u32,
    angle: Real,
    speed: Real,
    inertia: Real,
    applied_torque: Real,
    fixed: bool,
    var: Option<VariableHandle>,
}

impl Shaft {
    pub fn new(inertia: Real) -> Self {
        Self {
            id: 0,
            angle: 0.0,
            speed: 0.0,
            inertia,
            applied_torque: 0.0,
            fixed: false,
            var: None,
        }
    }

    pub fn angle(&self) -> Real {
        self.angle
    }

    pub fn set_angle(&mut self, angle: Real) {
        self.angle = angle;
    }

    pub fn speed(&self) -> Real {
        self.speed
    }

    pub fn set_speed(&mut self, speed: Real) {
        self.speed = speed;
    }

    pub fn inertia(&self) -> Real {
        self.inertia
    }

    pub fn set_inertia(&mut self, inertia: Real) {
        self.inertia = inertia;
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    pub fn apply_torque(&mut self, torque: Real) {
        self.applied_torque += torque;
    }

    pub fn clear_accumulators(&mut self) {
        self.applied_torque = 0.0;
    }

    pub fn var_handle(&self) -> Option<VariableHandle> {
        self.var
    }
}

impl StateOwner for Shaft {
    fn state_dims(&self) -> StateDims {
        StateDims::new(1, 1)
    }

    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta) {
        x.set(off_x, self.angle);
        v.set(off_w, self.speed);
    }

    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta) {
        self.angle = x.get(off_x);
        self.speed = v.get(off_w);
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
            x_new.set(off_x, x.get(off_x));
        } else {
            x_new.set(off_x, x.get(off_x) + dx.get(off_w));
        }
    }
}

impl VariableOwner for Shaft {
    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor) {
        self.var = if self.fixed {
            None
        } else {
            Some(descriptor.inject_variable(MassOperator::Shaft {
                inertia: self.inertia,
            }))
        };
    }

    fn load_forces(
        &mut self,
        descriptor: &mut SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        if let Some(h) = self.var {
            descriptor
                .variable_mut(h)?
                .load_forces(&[self.applied_torque], factor);
        }
        Ok(())
    }

    fn load_speeds(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        if let Some(h) = self.var {
            descriptor.variable_mut(h)?.load_speed(&[self.speed]);
        }
        Ok(())
    }

    fn fetch_speeds(&mut self, descriptor: &SystemDescriptor) -> KinetraResult<()> {
        if let Some(h) = self.var {
            self.speed = descriptor.variable(h)?.qb[0];
        }
        Ok(())
    }
}

impl Updatable for Shaft {
    fn update(&mut self, _time: Real, _update_assets: bool) {}
}
