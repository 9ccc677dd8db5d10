//! Simulation event types.
//!
//! Structured events emitted by the engine at various points in each
//! timestep. Events are lightweight value types that carry just enough
//! data to be useful for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by the engine.
///
/// Events are tagged with a timestep index and carry domain-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Timestep number (0-indexed).
    pub timestep: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// Timestep started.
    StepBegin {
        /// Target simulation time for this step (seconds).
        sim_time: f64,
    },

    /// Timestep completed.
    StepEnd {
        /// Wall-clock time for the entire timestep (seconds).
        wall_time: f64,
    },

    /// Constraint solve completed for the timestep.
    Solve {
        /// Iterations used (1 for the direct solver).
        iterations: u32,
        /// Final residual norm.
        residual: f64,
        /// Whether the solver converged within tolerance.
        converged: bool,
        /// Velocity-level unknowns in the assembled system.
        n_dof: u32,
        /// Constraint rows in the assembled system.
        n_constraints: u32,
    },

    /// A body crossed the sleep threshold.
    BodySleep {
        /// Identifier of the body that went to sleep.
        body_id: u32,
    },

    /// Checkpoint written to disk.
    CheckpointWritten {
        /// Destination path.
        path: String,
        /// Number of bodies recorded.
        body_count: u32,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given timestep.
    pub fn new(timestep: u32, kind: EventKind) -> Self {
        Self { timestep, kind }
    }
}
