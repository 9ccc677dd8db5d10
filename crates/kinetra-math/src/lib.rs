//! # kinetra-math
//!
//! Linear algebra primitives for the Kinetra multibody engine.
//!
//! Provides:
//! - Re-exports of `glam` f64 types (`DVec3`, `DQuat`, etc.)
//! - Rigid coordinate frame (position + quaternion) with local/parent
//!   transforms
//! - Quaternion integration and residual helpers for rotational state
//! - Sparse matrix representation (CSR) and Cholesky solver interface

pub mod cholesky;
pub mod frame;
pub mod rotation;
pub mod sparse;

// Re-export glam f64 types as the canonical math types for Kinetra.
pub use glam::{DMat3, DMat4, DQuat, DVec3, DVec4};

pub use frame::Frame;
