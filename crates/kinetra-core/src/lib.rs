//! # kinetra-core
//!
//! The constrained multibody assembly core: per-entity variable blocks,
//! bilateral constraint blocks, the per-step system descriptor, the
//! state-protocol traits every physics item implements, the pluggable
//! solver interface, and the time integrator.
//!
//! ## Key Types
//!
//! - [`VariableBlock`] / [`MassOperator`] — generalized-coordinate block
//!   registered by each dynamic entity per assembly
//! - [`ConstraintBlock`] — one scalar bilateral (or unilateral) row with
//!   Jacobians onto one or two variable blocks
//! - [`SystemDescriptor`] — the per-step arena both are injected into;
//!   handles are generation-counted and never survive an assembly
//! - [`ConstraintSolver`] — pluggable solver consuming an assembled
//!   descriptor
//! - [`EulerImplicitLinearized`] — the predict → assemble → solve →
//!   correct stepper

pub mod constraints;
pub mod descriptor;
pub mod integrator;
pub mod protocol;
pub mod solver;
pub mod state;
pub mod variables;

pub use constraints::{ConstraintBlock, ConstraintMode};
pub use descriptor::{ConstraintHandle, SystemDescriptor, VariableHandle};
pub use integrator::{EulerImplicitLinearized, Integrable, StepResult};
pub use protocol::{ConstraintOwner, LoadParams, StateDims, StateOwner, Updatable, VariableOwner};
pub use solver::{ConstraintSolver, SolveReport};
pub use state::{ReactionVec, StateDelta, StateVector};
pub use variables::{MassOperator, VariableBlock};
