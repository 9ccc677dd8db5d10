//! The system descriptor: per-step arena of variable and constraint
//! blocks.
//!
//! Active physics items inject their blocks each assembly cycle; the
//! descriptor assigns contiguous offsets and exposes the assembled
//! problem to the solver. Handles carry the assembly generation and are
//! rejected once a new cycle begins — stale offset reuse is a
//! correctness bug class this guards against explicitly.

use crate::constraints::ConstraintBlock;
use crate::state::ReactionVec;
use crate::variables::{MassOperator, VariableBlock};
use kinetra_types::{KinetraError, KinetraResult};

/// Handle to a variable block in the current assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableHandle {
    index: u32,
    generation: u64,
}

impl VariableHandle {
    /// Raw index into the descriptor's variable arena. Only meaningful
    /// for the generation the handle was issued in.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Handle to a constraint block in the current assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintHandle {
    index: u32,
    generation: u64,
}

impl ConstraintHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Aggregator for one assembly cycle.
///
/// Owned by the integrator and passed by reference through the assembly
/// pipeline — never ambient or global.
#[derive(Debug)]
pub struct SystemDescriptor {
    generation: u64,
    variables: Vec<VariableBlock>,
    constraints: Vec<ConstraintBlock>,
    n_dof: usize,
}

impl SystemDescriptor {
    pub fn new() -> Self {
        Self {
            generation: 0,
            variables: Vec::new(),
            constraints: Vec::new(),
            n_dof: 0,
        }
    }

    /// Starts a new assembly cycle: clears both collections and bumps
    /// the generation so handles from the previous cycle are rejected.
    pub fn begin_assembly(&mut self) {
        self.generation += 1;
        self.variables.clear();
        self.constraints.clear();
        self.n_dof = 0;
    }

    /// Current assembly generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Registers a variable block. Offsets into the global
    /// velocity-delta vector are assigned contiguously in injection
    /// order and are only valid for this assembly.
    pub fn inject_variable(&mut self, mass: MassOperator) -> VariableHandle {
        let handle = VariableHandle {
            index: self.variables.len() as u32,
            generation: self.generation,
        };
        let block = VariableBlock::new(mass, self.n_dof);
        self.n_dof += block.dof_w();
        self.variables.push(block);
        handle
    }

    /// Registers a constraint row. Fails if a referenced variable
    /// handle is stale or its Jacobian segment length does not match the
    /// block — the constraint is then simply not injected, never solved
    /// with stale data.
    pub fn inject_constraint(&mut self, mut block: ConstraintBlock) -> KinetraResult<ConstraintHandle> {
        let va = self.variable(block.var_a)?;
        if block.jac_a.len() != va.dof_w() {
            return Err(KinetraError::InactiveVariable);
        }
        if let Some(vb) = block.var_b {
            let vb = self.variable(vb)?;
            if block.jac_b.len() != vb.dof_w() {
                return Err(KinetraError::InactiveVariable);
            }
        }
        let handle = ConstraintHandle {
            index: self.constraints.len() as u32,
            generation: self.generation,
        };
        block.set_row(self.constraints.len());
        self.constraints.push(block);
        Ok(handle)
    }

    fn check_generation(&self, generation: u64) -> KinetraResult<()> {
        if generation != self.generation {
            return Err(KinetraError::StaleHandle {
                held: generation,
                current: self.generation,
            });
        }
        Ok(())
    }

    pub fn variable(&self, h: VariableHandle) -> KinetraResult<&VariableBlock> {
        self.check_generation(h.generation)?;
        self.variables
            .get(h.index())
            .ok_or(KinetraError::InactiveVariable)
    }

    pub fn variable_mut(&mut self, h: VariableHandle) -> KinetraResult<&mut VariableBlock> {
        self.check_generation(h.generation)?;
        self.variables
            .get_mut(h.index())
            .ok_or(KinetraError::InactiveVariable)
    }

    pub fn constraint(&self, h: ConstraintHandle) -> KinetraResult<&ConstraintBlock> {
        self.check_generation(h.generation)?;
        self.constraints
            .get(h.index())
            .ok_or(KinetraError::InactiveVariable)
    }

    pub fn constraint_mut(&mut self, h: ConstraintHandle) -> KinetraResult<&mut ConstraintBlock> {
        self.check_generation(h.generation)?;
        self.constraints
            .get_mut(h.index())
            .ok_or(KinetraError::InactiveVariable)
    }

    /// Total velocity-level DOFs injected this cycle.
    pub fn n_dof(&self) -> usize {
        self.n_dof
    }

    /// Number of scalar constraint rows injected this cycle.
    pub fn n_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variables(&self) -> &[VariableBlock] {
        &self.variables
    }

    pub fn constraints(&self) -> &[ConstraintBlock] {
        &self.constraints
    }

    /// Split mutable access for the solver, which indexes variables by
    /// the raw handle indices stored in the constraint rows.
    pub fn parts_mut(&mut self) -> (&mut [VariableBlock], &mut [ConstraintBlock]) {
        (&mut self.variables, &mut self.constraints)
    }

    /// Copies the row multipliers into `reactions`, one slot per row in
    /// injection order. `reactions` must have `n_constraints` slots.
    pub fn gather_reactions(&self, reactions: &mut ReactionVec) {
        for (i, c) in self.constraints.iter().enumerate() {
            reactions.set(i, c.lambda);
        }
    }

    /// Seeds the row multipliers from `reactions` (warm start). The
    /// caller guarantees the slot count matches this assembly.
    pub fn scatter_reactions(&mut self, reactions: &ReactionVec) {
        for (i, c) in self.constraints.iter_mut().enumerate() {
            c.lambda = reactions.get(i);
        }
    }
}

impl Default for SystemDescriptor {
    fn default() -> Self {
        Self::new()
    }
}
