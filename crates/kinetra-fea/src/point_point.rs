//! Point-point link: pins two xyz nodes together.
//!
//! Three bilateral rows with violation `C = pA − pB` and Jacobians
//! `[I, −I]`. The solver delivers the impulse `+λ` to node A; the
//! stored reaction reports `−λ`, the force the node exerts back on the
//! link. Node B's reaction is the opposite.

use kinetra_core::{ConstraintBlock, ConstraintHandle, LoadParams, SystemDescriptor};
use kinetra_math::DVec3;
use kinetra_types::{KinetraResult, NodeHandle, Real};

use crate::node::FeaNodeXyz;

/// Pin joint between two point nodes (handles into the xyz arena).
#[derive(Debug, Clone)]
pub struct PointPointLink {
    pub node_a: NodeHandle,
    pub node_b: NodeHandle,
    rows: [Option<ConstraintHandle>; 3],
    /// Reaction reported on node A (`−λ` in force units), world
    /// coordinates.
    pub react_on_a: DVec3,
}

impl PointPointLink {
    pub fn new(node_a: NodeHandle, node_b: NodeHandle) -> Self {
        Self {
            node_a,
            node_b,
            rows: [None; 3],
            react_on_a: DVec3::ZERO,
        }
    }

    pub fn inject_constraints(
        &mut self,
        descriptor: &mut SystemDescriptor,
        nodes: &[FeaNodeXyz],
    ) -> KinetraResult<()> {
        let ha = nodes[self.node_a.index()].var_handle();
        let hb = nodes[self.node_b.index()].var_handle();
        for (k, row) in self.rows.iter_mut().enumerate() {
            *row = match (ha, hb) {
                (Some(a), Some(b)) => {
                    let mut block = ConstraintBlock::pair(a, 3, b, 3);
                    block.jac_a[k] = 1.0;
                    block.jac_b[k] = -1.0;
                    Some(descriptor.inject_constraint(block)?)
                }
                (Some(a), None) => {
                    let mut block = ConstraintBlock::single(a, 3);
                    block.jac_a[k] = 1.0;
                    Some(descriptor.inject_constraint(block)?)
                }
                (None, Some(b)) => {
                    let mut block = ConstraintBlock::single(b, 3);
                    block.jac_a[k] = -1.0;
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
        nodes: &[FeaNodeXyz],
    ) -> KinetraResult<()> {
        let c = nodes[self.node_a.index()].pos - nodes[self.node_b.index()].pos;
        for (k, row) in self.rows.iter().enumerate() {
            if let Some(h) = *row {
                let block = descriptor.constraint_mut(h)?;
                block.bi_reset();
                block.bi_load_c(c[k], params.c_factor, params.recovery_clamp, params.do_clamp);
            }
        }
        Ok(())
    }

    pub fn fetch_reactions(
        &mut self,
        descriptor: &SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        let mut r = DVec3::ZERO;
        for (k, row) in self.rows.iter().enumerate() {
            if let Some(h) = *row {
                r[k] = descriptor.constraint(h)?.react(factor);
            }
        }
        self.react_on_a = -r;
        Ok(())
    }
}
