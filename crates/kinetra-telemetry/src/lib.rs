//! # kinetra-telemetry
//!
//! Event bus for simulation telemetry. Emits structured events
//! (stepping, solver convergence, checkpoints) that can be consumed
//! by pluggable sinks (log output, files, test capture).

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
