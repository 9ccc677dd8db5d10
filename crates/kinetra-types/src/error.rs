//! Error types for the Kinetra engine.
//!
//! All crates return `KinetraResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the Kinetra engine.
#[derive(Debug, Error)]
pub enum KinetraError {
    /// A variable or constraint handle from a previous assembly cycle
    /// was used in the current one.
    #[error("Stale handle: generation {held} used in assembly generation {current}")]
    StaleHandle { held: u64, current: u64 },

    /// A constraint referenced a variable block that is not active in
    /// the current assembly.
    #[error("Inactive variable block referenced by constraint")]
    InactiveVariable,

    /// Checkpoint or export data carried a shape tag the engine does not
    /// support. Both the write and the read path fail on this.
    #[error("Unsupported shape tag: {0}")]
    UnsupportedShape(u32),

    /// Checkpoint data is truncated or a field failed to parse.
    #[error("Malformed checkpoint: {0}")]
    Malformed(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The direct solver could not factor the reduced system.
    #[error("Factorization failed: {0}")]
    Factorization(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, KinetraError>`.
pub type KinetraResult<T> = Result<T, KinetraError>;
