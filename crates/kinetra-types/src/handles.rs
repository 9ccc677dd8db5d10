//! Strongly-typed arena handles for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of body indices with
//! shaft or FEA-node indices. The owning `System` holds the arenas;
//! coupling items store handles and resolve them at each assembly.

use serde::{Deserialize, Serialize};

/// Index into the rigid-body arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Index into the shaft arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaftHandle(pub u32);

/// Index into an FEA node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub u32);

impl BodyHandle {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ShaftHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl NodeHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for BodyHandle {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for ShaftHandle {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for NodeHandle {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
