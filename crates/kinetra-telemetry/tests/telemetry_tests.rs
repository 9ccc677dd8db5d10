//! Integration tests for kinetra-telemetry.

use kinetra_telemetry::bus::EventBus;
use kinetra_telemetry::events::{EventKind, SimulationEvent};
use kinetra_telemetry::sinks::VecSink;

#[test]
fn emit_and_flush_delivers_to_the_sink() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let events = sink.events();
    bus.add_sink(Box::new(sink));

    bus.emit(SimulationEvent::new(0, EventKind::StepBegin { sim_time: 0.0 }));
    bus.emit(SimulationEvent::new(0, EventKind::StepEnd { wall_time: 0.001 }));

    // Nothing arrives before the flush.
    assert!(events.lock().unwrap().is_empty());
    bus.flush();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].kind, EventKind::StepBegin { .. }));
    assert!(matches!(events[1].kind, EventKind::StepEnd { .. }));
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let events = sink.events();
    bus.add_sink(Box::new(sink));

    bus.set_enabled(false);
    bus.emit(SimulationEvent::new(0, EventKind::StepBegin { sim_time: 0.0 }));
    bus.flush();
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn multiple_sinks_each_receive_every_event() {
    let mut bus = EventBus::new();
    let first = VecSink::new();
    let second = VecSink::new();
    let first_events = first.events();
    let second_events = second.events();
    bus.add_sink(Box::new(first));
    bus.add_sink(Box::new(second));
    assert_eq!(bus.sink_count(), 2);

    bus.emit(SimulationEvent::new(3, EventKind::BodySleep { body_id: 1 }));
    bus.flush();
    assert_eq!(first_events.lock().unwrap().len(), 1);
    assert_eq!(second_events.lock().unwrap().len(), 1);
}

#[test]
fn event_serialization() {
    let event = SimulationEvent::new(
        5,
        EventKind::Solve {
            iterations: 12,
            residual: 1e-11,
            converged: true,
            n_dof: 6,
            n_constraints: 5,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered.timestep, 5);
    assert!(json.contains("converged"));
}

#[test]
fn checkpoint_event() {
    let event = SimulationEvent::new(
        10,
        EventKind::CheckpointWritten {
            path: "out/state.chk".into(),
            body_count: 3,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("state.chk"));
}

#[test]
fn shutdown_flushes_pending_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let events = sink.events();
    bus.add_sink(Box::new(sink));

    bus.emit(SimulationEvent::new(1, EventKind::BodySleep { body_id: 7 }));
    bus.shutdown();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].timestep, 1);
}
