//! The FEA assembly: node and link arenas plus the system attachment.
//!
//! Attaches to a `System` through the `AttachedItem` seam. Node state
//! lives after the multibody items in the global state vectors, in the
//! order xyz nodes then xyzD nodes.

use std::any::Any;

use kinetra_core::{
    LoadParams, StateDelta, StateDims, StateOwner, StateVector, SystemDescriptor, Updatable,
    VariableOwner,
};
use kinetra_math::DVec3;
use kinetra_physics::{AttachedItem, RigidBody};
use kinetra_types::{KinetraResult, NodeHandle, Real};

use crate::dir_frame::DirFrameLink;
use crate::node::{FeaNodeXyz, FeaNodeXyzD};
use crate::point_point::PointPointLink;

/// Container for FEA nodes and links.
#[derive(Default)]
pub struct FeaAssembly {
    nodes_xyz: Vec<FeaNodeXyz>,
    nodes_xyzd: Vec<FeaNodeXyzD>,
    point_links: Vec<PointPointLink>,
    dir_links: Vec<DirFrameLink>,
}

impl FeaAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a point node; the handle indexes the xyz arena.
    pub fn add_node_xyz(&mut self, node: FeaNodeXyz) -> NodeHandle {
        self.nodes_xyz.push(node);
        NodeHandle((self.nodes_xyz.len() - 1) as u32)
    }

    /// Adds a point+direction node; the handle indexes the xyzD arena.
    pub fn add_node_xyzd(&mut self, node: FeaNodeXyzD) -> NodeHandle {
        self.nodes_xyzd.push(node);
        NodeHandle((self.nodes_xyzd.len() - 1) as u32)
    }

    pub fn add_point_link(&mut self, link: PointPointLink) -> usize {
        self.point_links.push(link);
        self.point_links.len() - 1
    }

    pub fn add_dir_link(&mut self, link: DirFrameLink) -> usize {
        self.dir_links.push(link);
        self.dir_links.len() - 1
    }

    pub fn node_xyz(&self, h: NodeHandle) -> &FeaNodeXyz {
        &self.nodes_xyz[h.index()]
    }

    pub fn node_xyz_mut(&mut self, h: NodeHandle) -> &mut FeaNodeXyz {
        &mut self.nodes_xyz[h.index()]
    }

    pub fn node_xyzd(&self, h: NodeHandle) -> &FeaNodeXyzD {
        &self.nodes_xyzd[h.index()]
    }

    pub fn node_xyzd_mut(&mut self, h: NodeHandle) -> &mut FeaNodeXyzD {
        &mut self.nodes_xyzd[h.index()]
    }

    pub fn point_link(&self, index: usize) -> &PointPointLink {
        &self.point_links[index]
    }

    pub fn dir_link(&self, index: usize) -> &DirFrameLink {
        &self.dir_links[index]
    }
}

impl AttachedItem for FeaAssembly {
    fn state_dims(&self) -> StateDims {
        StateDims::new(
            3 * self.nodes_xyz.len() + 6 * self.nodes_xyzd.len(),
            3 * self.nodes_xyz.len() + 6 * self.nodes_xyzd.len(),
        )
    }

    fn gather_state(&self, off_x: usize, x: &mut StateVector, off_w: usize, v: &mut StateDelta) {
        let mut ox = off_x;
        let mut ow = off_w;
        for n in &self.nodes_xyz {
            n.gather_state(ox, x, ow, v);
            ox += 3;
            ow += 3;
        }
        for n in &self.nodes_xyzd {
            n.gather_state(ox, x, ow, v);
            ox += 6;
            ow += 6;
        }
    }

    fn scatter_state(&mut self, off_x: usize, x: &StateVector, off_w: usize, v: &StateDelta) {
        let mut ox = off_x;
        let mut ow = off_w;
        for n in &mut self.nodes_xyz {
            n.scatter_state(ox, x, ow, v);
            ox += 3;
            ow += 3;
        }
        for n in &mut self.nodes_xyzd {
            n.scatter_state(ox, x, ow, v);
            ox += 6;
            ow += 6;
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
        let mut ox = off_x;
        let mut ow = off_w;
        for n in &self.nodes_xyz {
            n.state_increment(ox, x_new, x, ow, dx);
            ox += 3;
            ow += 3;
        }
        for n in &self.nodes_xyzd {
            n.state_increment(ox, x_new, x, ow, dx);
            ox += 6;
            ow += 6;
        }
    }

    fn update(&mut self, time: Real, update_assets: bool) {
        for n in &mut self.nodes_xyz {
            n.update(time, update_assets);
        }
        for n in &mut self.nodes_xyzd {
            n.update(time, update_assets);
        }
    }

    fn inject_variables(&mut self, descriptor: &mut SystemDescriptor) {
        for n in &mut self.nodes_xyz {
            n.inject_variables(descriptor);
        }
        for n in &mut self.nodes_xyzd {
            n.inject_variables(descriptor);
        }
    }

    fn inject_constraints(
        &mut self,
        descriptor: &mut SystemDescriptor,
        bodies: &[RigidBody],
    ) -> KinetraResult<()> {
        for l in &mut self.point_links {
            l.inject_constraints(descriptor, &self.nodes_xyz)?;
        }
        for l in &mut self.dir_links {
            l.inject_constraints(descriptor, &self.nodes_xyzd, bodies)?;
        }
        Ok(())
    }

    fn load(
        &mut self,
        descriptor: &mut SystemDescriptor,
        params: &LoadParams,
        gravity: DVec3,
        _bodies: &[RigidBody],
    ) -> KinetraResult<()> {
        for n in &mut self.nodes_xyz {
            n.apply_force(gravity * n.mass());
            n.load_forces(descriptor, params.force_factor)?;
            n.load_speeds(descriptor)?;
            n.clear_accumulators();
        }
        for n in &mut self.nodes_xyzd {
            n.apply_force(gravity * n.mass());
            n.load_forces(descriptor, params.force_factor)?;
            n.load_speeds(descriptor)?;
            n.clear_accumulators();
        }
        for l in &mut self.point_links {
            l.load_constraint_terms(descriptor, params, &self.nodes_xyz)?;
        }
        for l in &mut self.dir_links {
            l.load_constraint_terms(descriptor, params, &self.nodes_xyzd)?;
        }
        Ok(())
    }

    fn apply_solution(
        &mut self,
        descriptor: &SystemDescriptor,
        react_factor: Real,
    ) -> KinetraResult<()> {
        for n in &mut self.nodes_xyz {
            n.fetch_speeds(descriptor)?;
        }
        for n in &mut self.nodes_xyzd {
            n.fetch_speeds(descriptor)?;
        }
        for l in &mut self.point_links {
            l.fetch_reactions(descriptor, react_factor)?;
        }
        for l in &mut self.dir_links {
            l.fetch_reactions(descriptor, react_factor)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
