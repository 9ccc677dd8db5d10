//! # kinetra-types
//!
//! Shared types, arena handles, error types, and physical constants
//! for the Kinetra multibody dynamics engine.
//!
//! This crate has zero domain logic — it defines the vocabulary
//! that all other Kinetra crates share.

pub mod constants;
pub mod error;
pub mod handles;
pub mod scalar;

pub use error::{KinetraError, KinetraResult};
pub use handles::{BodyHandle, NodeHandle, ShaftHandle};
pub use scalar::Real;
