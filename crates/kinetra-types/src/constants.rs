//! Physical constants and simulation defaults.

use crate::scalar::Real;

/// Gravitational acceleration (m/s²).
pub const GRAVITY: Real = 9.81;

/// Default simulation timestep (seconds).
pub const DEFAULT_DT: Real = 0.01;

/// Default solver iteration budget per timestep.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Default over-relaxation factor for the iterative solver.
pub const DEFAULT_OMEGA: Real = 1.0;

/// Default clamp on position-recovery speed (m/s). Large constraint
/// violations are stabilized no faster than this.
pub const DEFAULT_RECOVERY_CLAMP: Real = 0.1;

/// Default constraint-force mixing term added to the Schur diagonal.
/// Keeps the reduced system positive-definite under singular mass
/// operators.
pub const DEFAULT_CFM: Real = 1.0e-9;

/// Epsilon for floating-point comparisons.
pub const EPSILON: Real = 1.0e-10;

/// Full turn, used by the screw thread/tau conversion.
pub const TWO_PI: Real = 2.0 * std::f64::consts::PI;
