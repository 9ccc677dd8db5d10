//! Gear coupling between two shafts.
//!
//! One bilateral row enforcing `ratio·w1 − w2 = 0` at the velocity
//! level, with no positional stabilization. The reaction torque on
//! shaft 1 is `ratio·τ` and on shaft 2 is `−τ`, where `τ` is the solved
//! multiplier converted to torque units. Consumers depend on exactly
//! this sign/scale convention.

use kinetra_core::{ConstraintBlock, ConstraintHandle, LoadParams, SystemDescriptor};
use kinetra_types::{KinetraResult, Real, ShaftHandle};

use crate::shaft::Shaft;

/// Transmission-ratio coupling referencing two shafts by handle.
#[derive(Debug, Clone)]
pub struct ShaftGear {
    pub shaft_1: ShaftHandle,
    pub shaft_2: ShaftHandle,
    ratio: Real,
    torque_on_shaft_1: Real,
    torque_on_shaft_2: Real,
    row: Option<ConstraintHandle>,
}

impl ShaftGear {
    pub fn new(shaft_1: ShaftHandle, shaft_2: ShaftHandle, ratio: Real) -> Self {
        Self {
            shaft_1,
            shaft_2,
            ratio,
            torque_on_shaft_1: 0.0,
            torque_on_shaft_2: 0.0,
            row: None,
        }
    }

    pub fn ratio(&self) -> Real {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: Real) {
        self.ratio = ratio;
    }

    /// Reaction torque exerted on shaft 1 (`ratio·τ`).
    pub fn torque_on_shaft_1(&self) -> Real {
        self.torque_on_shaft_1
    }

    /// Reaction torque exerted on shaft 2 (`−τ`).
    pub fn torque_on_shaft_2(&self) -> Real {
        self.torque_on_shaft_2
    }

    /// Registers the ratio row. A fixed shaft contributes no variable,
    /// so the row collapses to the dynamic side; with both shafts fixed
    /// there is nothing to constrain.
    pub fn inject_constraints(
        &mut self,
        descriptor: &mut SystemDescriptor,
        shafts: &[Shaft],
    ) -> KinetraResult<()> {
        let h1 = shafts[self.shaft_1.index()].var_handle();
        let h2 = shafts[self.shaft_2.index()].var_handle();
        self.row = match (h1, h2) {
            (Some(a), Some(b)) => {
                let mut block = ConstraintBlock::pair(a, 1, b, 1);
                block.jac_a[0] = self.ratio;
                block.jac_b[0] = -1.0;
                Some(descriptor.inject_constraint(block)?)
            }
            (Some(a), None) => {
                let mut block = ConstraintBlock::single(a, 1);
                block.jac_a[0] = self.ratio;
                Some(descriptor.inject_constraint(block)?)
            }
            (None, Some(b)) => {
                let mut block = ConstraintBlock::single(b, 1);
                block.jac_a[0] = -1.0;
                Some(descriptor.inject_constraint(block)?)
            }
            (None, None) => None,
        };
        Ok(())
    }

    /// The ratio constraint is purely a velocity-level coupling: no
    /// positional violation and no rheonomic term.
    pub fn load_constraint_terms(
        &mut self,
        descriptor: &mut SystemDescriptor,
        _params: &LoadParams,
    ) -> KinetraResult<()> {
        if let Some(h) = self.row {
            descriptor.constraint_mut(h)?.bi_reset();
        }
        Ok(())
    }

    pub fn fetch_reactions(
        &mut self,
        descriptor: &SystemDescriptor,
        factor: Real,
    ) -> KinetraResult<()> {
        if let Some(h) = self.row {
            let tau = descriptor.constraint(h)?.react(factor);
            self.torque_on_shaft_1 = self.ratio * tau;
            self.torque_on_shaft_2 = -tau;
        } else {
            self.torque_on_shaft_1 = 0.0;
            self.torque_on_shaft_2 = 0.0;
        }
        Ok(())
    }
}
