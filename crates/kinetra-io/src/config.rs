//! Simulation configuration, loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use kinetra_types::constants::{
    DEFAULT_CFM, DEFAULT_DT, DEFAULT_MAX_ITERATIONS, DEFAULT_OMEGA, DEFAULT_RECOVERY_CLAMP,
    GRAVITY,
};
use kinetra_types::{KinetraError, KinetraResult, Real};

/// Solver selection and tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolverConfig {
    /// Iterative projected SOR.
    Psor {
        #[serde(default = "default_iterations")]
        max_iterations: usize,
        #[serde(default = "default_omega")]
        omega: Real,
        #[serde(default = "default_tolerance")]
        tolerance: Real,
    },
    /// Direct Schur-complement Cholesky.
    Schur {
        #[serde(default = "default_cfm")]
        cfm: Real,
    },
}

fn default_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS as usize
}

fn default_omega() -> Real {
    DEFAULT_OMEGA
}

fn default_tolerance() -> Real {
    1e-10
}

fn default_cfm() -> Real {
    DEFAULT_CFM
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::Psor {
            max_iterations: default_iterations(),
            omega: default_omega(),
            tolerance: default_tolerance(),
        }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Step size in seconds.
    pub timestep: Real,
    /// Total simulated time in seconds.
    pub duration: Real,
    /// Gravity vector, m/s².
    pub gravity: [Real; 3],
    /// Clamp on position-recovery speed.
    pub recovery_clamp: Real,
    /// Whether violation recovery is clamped at all.
    pub use_clamping: bool,
    pub solver: SolverConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: DEFAULT_DT,
            duration: 1.0,
            gravity: [0.0, -GRAVITY, 0.0],
            recovery_clamp: DEFAULT_RECOVERY_CLAMP,
            use_clamping: true,
            solver: SolverConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(data: &str) -> KinetraResult<Self> {
        let config: SimulationConfig =
            toml::from_str(data).map_err(|e| KinetraError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> KinetraResult<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_toml_string(&self) -> KinetraResult<String> {
        toml::to_string_pretty(self).map_err(|e| KinetraError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> KinetraResult<()> {
        if self.timestep <= 0.0 {
            return Err(KinetraError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.duration < 0.0 {
            return Err(KinetraError::InvalidConfig(format!(
                "duration must be non-negative, got {}",
                self.duration
            )));
        }
        if let SolverConfig::Psor { max_iterations, .. } = self.solver {
            if max_iterations == 0 {
                return Err(KinetraError::InvalidConfig(
                    "solver max_iterations must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }
}
