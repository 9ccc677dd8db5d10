//! The owning simulation system.
//!
//! The `System` holds every entity in per-kind arenas and drives them
//! through the assembly cycle as one [`Integrable`]. Coupling items
//! (gears, joints) reference their partners by arena handle and get the
//! arenas as explicit parameters each phase, so a stale reference can
//! never outlive the entity it points at.
//!
//! External assemblies (FEA meshes) attach through [`AttachedItem`],
//! which inverts the dependency: the attachment sees the body arena but
//! the system knows nothing of its internals.

use std::any::Any;

use kinetra_core::{
    ConstraintOwner, EulerImplicitLinearized, Integrable, LoadParams, StateDelta, StateDims,
    StateOwner, StateVector, StepResult, SystemDescriptor, Updatable, VariableOwner,
};
use kinetra_core::ConstraintSolver;
use kinetra_math::DVec3;
use kinetra_types::constants::GRAVITY;
use kinetra_types::{BodyHandle, KinetraResult, Real, ShaftHandle};

use crate::body::RigidBody;
use crate::conveyor::Conveyor;
use crate::gear::ShaftGear;
use crate::joint::Joint;
use crate::particles::ParticleCluster;
use crate::shaft::Shaft;

/// An externally defined assembly participating in the step pipeline.
///
/// Implementors own their nodes and links; the body arena is passed in
/// so links can couple to rigid bodies by handle.
pub trait AttachedItem {
    fn state_dims(&self) -> StateDims;
    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta);
    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta);
    fn state_increment(
        &self,
        off_x: usize,
        x_new: &mut StateVector,
        x: &StateVector,
        off_w: usize,
        dx: &StateDelta,
    );
    fn update(&mut self, time: Real, update_assets: bool);
    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor);
    fn inject_constraints(
        &mut self,
        descriptor: &mut SystemDescriptor,
        bodies: &[RigidBody],
    ) -> KinetraResult<()>;
    /// Loads forces, speeds, and constraint terms in one pass.
    fn load(
        &mut self,
        descriptor: &mut SystemDescriptor,
        params: &LoadParams,
        gravity: DVec3,
        bodies: &[RigidBody],
    ) -> KinetraResult<()>;
    /// Fetches solved speeds and reactions.
    fn apply_solution(
        &mut self,
        descriptor: &SystemDescriptor,
        react_factor: Real,
    ) -> KinetraResult<()>;
    /// Concrete-type access for owners that need to read results back.
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The simulation world: arenas, gravity, and simulated time.
pub struct System {
    pub gravity: DVec3,
    time: Real,
    bodies: Vec<RigidBody>,
    shafts: Vec<Shaft>,
    gears: Vec<ShaftGear>,
    joints: Vec<Joint>,
    conveyors: Vec<Conveyor>,
    clusters: Vec<ParticleCluster>,
    attachments: Vec<Box<dyn AttachedItem>>,
}

impl System {
    pub fn new() -> Self {
        Self {
            gravity: DVec3::new(0.0, -GRAVITY, 0.0),
            time: 0.0,
            bodies: Vec::new(),
            shafts: Vec::new(),
            gears: Vec::new(),
            joints: Vec::new(),
            conveyors: Vec::new(),
            clusters: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn set_time(&mut self, time: Real) {
        self.time = time;
    }

    // ─── arena management ───

    pub fn add_body(&mut self, mut body: RigidBody) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        body.id = handle.0;
        self.bodies.push(body);
        handle
    }

    pub fn add_shaft(&mut self, mut shaft: Shaft) -> ShaftHandle {
        let handle = ShaftHandle(self.shafts.len() as u32);
        shaft.id = handle.0;
        self.shafts.push(shaft);
        handle
    }

    pub fn add_gear(&mut self, gear: ShaftGear) -> usize {
        self.gears.push(gear);
        self.gears.len() - 1
    }

    pub fn add_joint(&mut self, joint: Joint) -> usize {
        self.joints.push(joint);
        self.joints.len() - 1
    }

    pub fn add_conveyor(&mut self, conveyor: Conveyor) -> usize {
        self.conveyors.push(conveyor);
        self.conveyors.len() - 1
    }

    pub fn add_cluster(&mut self, mut cluster: ParticleCluster) -> usize {
        cluster.id = self.clusters.len() as u32;
        self.clusters.push(cluster);
        self.clusters.len() - 1
    }

    pub fn attach(&mut self, item: Box<dyn AttachedItem>) -> usize {
        self.attachments.push(item);
        self.attachments.len() - 1
    }

    pub fn body(&self, h: BodyHandle) -> &RigidBody {
        &self.bodies[h.index()]
    }

    pub fn body_mut(&mut self, h: BodyHandle) -> &mut RigidBody {
        &mut self.bodies[h.index()]
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn shaft(&self, h: ShaftHandle) -> &Shaft {
        &self.shafts[h.index()]
    }

    pub fn shaft_mut(&mut self, h: ShaftHandle) -> &mut Shaft {
        &mut self.shafts[h.index()]
    }

    pub fn shafts(&self) -> &[Shaft] {
        &self.shafts
    }

    pub fn gear(&self, index: usize) -> &ShaftGear {
        &self.gears[index]
    }

    pub fn gear_mut(&mut self, index: usize) -> &mut ShaftGear {
        &mut self.gears[index]
    }

    pub fn joint(&self, index: usize) -> &Joint {
        &self.joints[index]
    }

    pub fn joint_mut(&mut self, index: usize) -> &mut Joint {
        &mut self.joints[index]
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn conveyor(&self, index: usize) -> &Conveyor {
        &self.conveyors[index]
    }

    pub fn conveyor_mut(&mut self, index: usize) -> &mut Conveyor {
        &mut self.conveyors[index]
    }

    pub fn cluster(&self, index: usize) -> &ParticleCluster {
        &self.clusters[index]
    }

    pub fn cluster_mut(&mut self, index: usize) -> &mut ParticleCluster {
        &mut self.clusters[index]
    }

    pub fn clusters(&self) -> &[ParticleCluster] {
        &self.clusters
    }

    pub fn attachment(&self, index: usize) -> &dyn AttachedItem {
        self.attachments[index].as_ref()
    }

    pub fn attachment_mut(&mut self, index: usize) -> &mut dyn AttachedItem {
        self.attachments[index].as_mut()
    }

    /// Advances the system by one step of size `h` and moves the
    /// simulated clock.
    pub fn do_step<C: ConstraintSolver>(
        &mut self,
        integrator: &mut EulerImplicitLinearized,
        solver: &mut C,
        h: Real,
    ) -> KinetraResult<StepResult> {
        let t = self.time;
        let result = integrator.advance(self, solver, t, h)?;
        self.time = result.t_end;
        tracing::trace!(
            t = result.t_end,
            iterations = result.solve.iterations,
            residual = result.solve.residual,
            "step"
        );
        Ok(result)
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl Integrable for System {
    fn state_dims(&self) -> StateDims {
        let mut dims = StateDims::default();
        for b in &self.bodies {
            dims += b.state_dims();
        }
        for s in &self.shafts {
            dims += s.state_dims();
        }
        for c in &self.conveyors {
            dims += c.state_dims();
        }
        for c in &self.clusters {
            dims += c.state_dims();
        }
        for a in &self.attachments {
            dims += a.state_dims();
        }
        dims
    }

    fn update(&mut self, time: Real, update_assets: bool) {
        for b in &mut self.bodies {
            b.update(time, update_assets);
        }
        for s in &mut self.shafts {
            s.update(time, update_assets);
        }
        for c in &mut self.conveyors {
            c.update(time, update_assets);
        }
        for c in &mut self.clusters {
            c.update(time, update_assets);
        }
        for a in &mut self.attachments {
            a.update(time, update_assets);
        }
    }

    fn inject(&mut self, descriptor: &mut SystemDescriptor) -> KinetraResult<()> {
        // Variables first: constraint rows reference their handles.
        for b in &mut self.bodies {
            b.inject_variables(descriptor);
        }
        for s in &mut self.shafts {
            s.inject_variables(descriptor);
        }
        for c in &mut self.conveyors {
            VariableOwner::inject_variables(c, descriptor);
        }
        for c in &mut self.clusters {
            c.inject_variables(descriptor);
        }
        for a in &mut self.attachments {
            a.inject_variables(descriptor);
        }

        for g in &mut self.gears {
            g.inject_constraints(descriptor, &self.shafts)?;
        }
        for j in &mut self.joints {
            j.inject_constraints(descriptor, &self.bodies)?;
        }
        for c in &mut self.conveyors {
            ConstraintOwner::inject_constraints(c, descriptor)?;
        }
        for a in &mut self.attachments {
            a.inject_constraints(descriptor, &self.bodies)?;
        }
        Ok(())
    }

    fn load(
        &mut self,
        descriptor: &mut SystemDescriptor,
        params: &LoadParams,
    ) -> KinetraResult<()> {
        for j in &self.joints {
            j.apply_spring_forces(&mut self.bodies);
        }

        let gravity = self.gravity;
        for b in &mut self.bodies {
            if b.is_active() {
                b.apply_gravity(gravity);
            }
            b.load_forces(descriptor, params.force_factor)?;
            b.load_speeds(descriptor)?;
            b.clear_accumulators();
        }
        for s in &mut self.shafts {
            s.load_forces(descriptor, params.force_factor)?;
            s.load_speeds(descriptor)?;
            s.clear_accumulators();
        }
        for c in &mut self.conveyors {
            c.apply_gravity(gravity);
            c.load_forces(descriptor, params.force_factor)?;
            c.load_speeds(descriptor)?;
            c.load_constraint_terms(descriptor, params)?;
            c.clear_accumulators();
        }
        for c in &mut self.clusters {
            c.apply_force_all(gravity * c.mass());
            c.load_forces(descriptor, params.force_factor)?;
            c.load_speeds(descriptor)?;
            c.clear_accumulators();
        }

        for g in &mut self.gears {
            g.load_constraint_terms(descriptor, params)?;
        }
        for j in &mut self.joints {
            j.load_constraint_terms(descriptor, params, &self.bodies)?;
        }
        for a in &mut self.attachments {
            a.load(descriptor, params, gravity, &self.bodies)?;
        }
        Ok(())
    }

    fn apply_solution(
        &mut self,
        descriptor: &SystemDescriptor,
        react_factor: Real,
    ) -> KinetraResult<()> {
        for b in &mut self.bodies {
            b.fetch_speeds(descriptor)?;
        }
        for s in &mut self.shafts {
            s.fetch_speeds(descriptor)?;
        }
        for c in &mut self.conveyors {
            c.fetch_speeds(descriptor)?;
            c.fetch_reactions(descriptor, react_factor)?;
        }
        for c in &mut self.clusters {
            c.fetch_speeds(descriptor)?;
        }
        for g in &mut self.gears {
            g.fetch_reactions(descriptor, react_factor)?;
        }
        for j in &mut self.joints {
            j.fetch_reactions(descriptor, react_factor)?;
        }
        for a in &mut self.attachments {
            a.apply_solution(descriptor, react_factor)?;
        }
        Ok(())
    }

    fn gather_state(&self, x: &mut StateVector, v: &mut StateDelta) {
        let mut ox = 0;
        let mut ow = 0;
        for b in &self.bodies {
            b.gather_state(ox, x, ow, v);
            ox += 7;
            ow += 6;
        }
        for s in &self.shafts {
            s.gather_state(ox, x, ow, v);
            ox += 1;
            ow += 1;
        }
        for c in &self.conveyors {
            c.gather_state(ox, x, ow, v);
            let d = c.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
        for c in &self.clusters {
            c.gather_state(ox, x, ow, v);
            let d = c.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
        for a in &self.attachments {
            a.gather_state(ox, x, ow, v);
            let d = a.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
    }

    fn scatter_state(&mut self, x: &StateVector, v: &StateDelta) -> KinetraResult<()> {
        let mut ox = 0;
        let mut ow = 0;
        for b in &mut self.bodies {
            b.scatter_state(ox, x, ow, v);
            ox += 7;
            ow += 6;
        }
        for s in &mut self.shafts {
            s.scatter_state(ox, x, ow, v);
            ox += 1;
            ow += 1;
        }
        for c in &mut self.conveyors {
            c.scatter_state(ox, x, ow, v);
            let d = c.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
        for c in &mut self.clusters {
            c.scatter_state(ox, x, ow, v);
            let d = c.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
        for a in &mut self.attachments {
            a.scatter_state(ox, x, ow, v);
            let d = a.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
        Ok(())
    }

    fn state_increment(&self, x_new: &mut StateVector, x: &StateVector, dx: &StateDelta) {
        let mut ox = 0;
        let mut ow = 0;
        for b in &self.bodies {
            b.state_increment(ox, x_new, x, ow, dx);
            ox += 7;
            ow += 6;
        }
        for s in &self.shafts {
            s.state_increment(ox, x_new, x, ow, dx);
            ox += 1;
            ow += 1;
        }
        for c in &self.conveyors {
            c.state_increment(ox, x_new, x, ow, dx);
            let d = c.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
        for c in &self.clusters {
            c.state_increment(ox, x_new, x, ow, dx);
            let d = c.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
        for a in &self.attachments {
            a.state_increment(ox, x_new, x, ow, dx);
            let d = a.state_dims();
            ox += d.n_x;
            ow += d.n_w;
        }
    }
}
