//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them (log output,
//! in-memory capture for tests, custom consumers).

use std::sync::{Arc, Mutex};

use crate::events::SimulationEvent;

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the simulation ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// A simple sink that collects events into a shared `Vec` for testing
/// and inspection.
///
/// Registering a sink moves it into the bus, so the collected events
/// are read through the shared handle from [`VecSink::events`], cloned
/// before the move.
pub struct VecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the collected events.
    pub fn events(&self) -> Arc<Mutex<Vec<SimulationEvent>>> {
        Arc::clone(&self.events)
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        // The event! macro needs a const level, so branch per level.
        macro_rules! log_event {
            ($level:expr) => {
                tracing::event!(
                    $level,
                    timestep = event.timestep,
                    event = ?event.kind,
                    "simulation_event"
                )
            };
        }
        if self.level == tracing::Level::ERROR {
            log_event!(tracing::Level::ERROR);
        } else if self.level == tracing::Level::WARN {
            log_event!(tracing::Level::WARN);
        } else if self.level == tracing::Level::INFO {
            log_event!(tracing::Level::INFO);
        } else if self.level == tracing::Level::DEBUG {
            log_event!(tracing::Level::DEBUG);
        } else {
            log_event!(tracing::Level::TRACE);
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
