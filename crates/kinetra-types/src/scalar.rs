//! Scalar type alias for the simulation.
//!
//! Constraint stabilization and long-running quaternion integration are
//! sensitive to rounding, so the engine runs in `f64` end to end.

/// The floating-point type used throughout the engine.
pub type Real = f64;
