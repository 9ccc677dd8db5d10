//! Direction-frame link: keeps a node direction parallel to a rigid
//! body frame direction.
//!
//! Two bilateral rows. The reference direction `E` is stored in body
//! coordinates and rotates with the body; the constraint axes are the
//! two directions orthogonal to `E` from a stable completion frame.
//! For each axis `a_k`: `C_k = a_k · D`, and the Jacobian accounts for
//! the rotating body frame through `ȧ_k = ω_b × a_k`:
//! `Ċ_k = a_k·Ḋ + ω_b·(a_k × D)`.

use kinetra_core::{ConstraintBlock, ConstraintHandle, LoadParams, SystemDescriptor};
use kinetra_math::{DVec3, Frame};
use kinetra_physics::RigidBody;
use kinetra_types::{BodyHandle, KinetraResult, NodeHandle, Real};

use crate::node::FeaNodeXyzD;

/// Couples an xyzD node's direction to a rigid body's frame.
#[derive(Debug, Clone)]
pub struct DirFrameLink {
    /// Handle into the xyzD node arena.
    pub node: NodeHandle,
    pub body: BodyHandle,
    /// Reference direction in body coordinates.
    dir_local: DVec3,
    rows: [Option<ConstraintHandle>; 2],
    /// World constraint axes cached at injection, valid for one
    /// assembly.
    axes_cache: [DVec3; 2],
    /// Reported reaction pair, world coordinates: `−λ` resolved on the
    /// node direction, `+λ` on the body. The solver delivers `+λ` to
    /// the node slots; the report flips it, node-side like the
    /// point-point link.
    pub react_on_node: DVec3,
    pub react_on_body: DVec3,
}

impl DirFrameLink {
    /// Creates the link with the reference direction taken from the
    /// node's current direction, expressed in body coordinates.
    pub fn new(node: NodeHandle, body: BodyHandle, nodes: &[FeaNodeXyzD], bodies: &[RigidBody]) -> Self {
        let d_world = nodes[node.index()].dir;
        let dir_local = bodies[body.index()].frame().dir_to_local(d_world);
        Self {
            node,
            body,
            dir_local,
            rows: [None; 2],
            axes_cache: [DVec3::ZERO; 2],
            react_on_node: DVec3::ZERO,
            react_on_body: DVec3::ZERO,
        }
    }

    /// Sets the reference direction, given in body coordinates.
    pub fn set_direction_in_body_coords(&mut self, dir_local: DVec3) {
        self.dir_local = dir_local.normalize_or_zero();
    }

    /// Sets the reference direction, given in world coordinates at the
    /// body's current placement.
    pub fn set_direction_in_absolute_coords(&mut self, dir_world: DVec3, bodies: &[RigidBody]) {
        self.dir_local = bodies[self.body.index()]
            .frame()
            .dir_to_local(dir_world)
            .normalize_or_zero();
    }

    pub fn direction_in_body_coords(&self) -> DVec3 {
        self.dir_local
    }

    /// The two constraint axes, orthogonal to the world reference
    /// direction.
    fn axes(&self, body: &RigidBody) -> (DVec3, DVec3, DVec3) {
        let e_world = body.frame().dir_to_parent(self.dir_local);
        let m = Frame::from_x_axis(DVec3::ZERO, e_world);
        (e_world, m.y_axis(), m.z_axis())
    }

    pub fn inject_constraints(
        &mut self,
        descriptor: &mut SystemDescriptor,
        nodes: &[FeaNodeXyzD],
        bodies: &[RigidBody],
    ) -> KinetraResult<()> {
        let node = &nodes[self.node.index()];
        let body = &bodies[self.body.index()];
        let hn = node.dir_var_handle();
        let hb = body.var_handle();
        let (_, a1, a2) = self.axes(body);
        self.axes_cache = [a1, a2];
        let d = node.dir;

        for (k, axis) in [a1, a2].into_iter().enumerate() {
            // Body angular entries: ω_b · (a_k × D), in body-local ω.
            let g = body.frame().dir_to_local(axis.cross(d));
            self.rows[k] = match (hn, hb) {
                (Some(n), Some(b)) => {
                    let mut block = ConstraintBlock::pair(n, 3, b, 6);
                    block.jac_a[0] = axis.x;
                    block.jac_a[1] = axis.y;
                    block.jac_a[2] = axis.z;
                    block.jac_b[3] = g.x;
                    block.jac_b[4] = g.y;
                    block.jac_b[5] = g.z;
                    Some(descriptor.inject_constraint(block)?)
                }
                (Some(n), None) => {
                    let mut block = ConstraintBlock::single(n, 3);
                    block.jac_a[0] = axis.x;
                    block.jac_a[1] = axis.y;
                    block.jac_a[2] = axis.z;
                    Some(descriptor.inject_constraint(block)?)
                }
                (None, Some(b)) => {
                    let mut block = ConstraintBlock::single(b, 6);
                    block.jac_a[3] = g.x;
                    block.jac_a[4] = g.y;
                    block.jac_a[5] = g.z;
                    Some(descriptor.inject_constraint(block)?)
                }
                (None, None) => None,
            };
        }
        Ok(())
    }

    pub fn load_constraint_terms(
        &mut self,
        descriptor: &mut SystemDescriptor,
        params: &LoadParams,
        nodes: &[FeaNodeXyzD],
    ) -> KinetraResult<()> {
        let node = &nodes[self.node.index()];
        let [a1, a2] = self.axes_cache;
        for (k, axis) in [a1, a2].into_iter().enumerate() {
            if let Some(h) = self.rows[k] {
                let block = descriptor.constraint_mut(h)?;
                block.bi_reset();
                block.bi_load_c(
                    axis.dot(node.dir),
                    params.c_factor,
                    params.recovery_clamp,
                    params.do_clamp,
                );
            }
        }
        Ok(())
    }

    pub fn fetch_reactions(
        &mut self,
        descriptor: &SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        let [a1, a2] = self.axes_cache;
        let mut r = DVec3::ZERO;
        for (k, axis) in [a1, a2].into_iter().enumerate() {
            if let Some(h) = self.rows[k] {
                r += axis * descriptor.constraint(h)?.react(factor);
            }
        }
        self.react_on_node = -r;
        self.react_on_body = r;
        Ok(())
    }
}
