//! Contact material parameter sets.
//!
//! Two families, matching the two contact formulations: non-smooth
//! (complementarity-based, 8 parameters) and smooth (penalty-based,
//! 7 parameters). The checkpoint format selects the family from the
//! body-type tag and writes the corresponding field count.

use serde::{Deserialize, Serialize};

use kinetra_types::Real;

/// Surface material attached to a body or particle cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactMaterial {
    /// Non-smooth contact (measure-differential-inclusion family).
    Nsc {
        friction: Real,
        rolling_friction: Real,
        spinning_friction: Real,
        restitution: Real,
        cohesion: Real,
        compliance: Real,
        compliance_tangential: Real,
        damping: Real,
    },
    /// Smooth contact (penalty family).
    Smc {
        young_modulus: Real,
        poisson_ratio: Real,
        friction: Real,
        restitution: Real,
        adhesion: Real,
        normal_stiffness: Real,
        normal_damping: Real,
    },
}

impl ContactMaterial {
    /// Body-type tag written as the first checkpoint field: 0 for
    /// non-smooth, 1 for smooth.
    pub fn type_tag(&self) -> u32 {
        match self {
            ContactMaterial::Nsc { .. } => 0,
            ContactMaterial::Smc { .. } => 1,
        }
    }

    /// Number of scalar fields on the material line of a checkpoint.
    pub fn field_count(&self) -> usize {
        match self {
            ContactMaterial::Nsc { .. } => 8,
            ContactMaterial::Smc { .. } => 7,
        }
    }

    /// Default non-smooth material: dry friction 0.6, everything else
    /// inert.
    pub fn default_nsc() -> Self {
        ContactMaterial::Nsc {
            friction: 0.6,
            rolling_friction: 0.0,
            spinning_friction: 0.0,
            restitution: 0.0,
            cohesion: 0.0,
            compliance: 0.0,
            compliance_tangential: 0.0,
            damping: 0.0,
        }
    }

    /// Default smooth material: stiff elastic surface, no adhesion.
    pub fn default_smc() -> Self {
        ContactMaterial::Smc {
            young_modulus: 2.0e5,
            poisson_ratio: 0.3,
            friction: 0.6,
            restitution: 0.4,
            adhesion: 0.0,
            normal_stiffness: 2.0e5,
            normal_damping: 40.0,
        }
    }

    /// Flattens to the checkpoint field order.
    pub fn fields(&self) -> Vec<Real> {
        match *self {
            ContactMaterial::Nsc {
                friction,
                rolling_friction,
                spinning_friction,
                restitution,
                cohesion,
                compliance,
                compliance_tangential,
                damping,
            } => vec![
                friction,
                rolling_friction,
                spinning_friction,
                restitution,
                cohesion,
                compliance,
                compliance_tangential,
                damping,
            ],
            ContactMaterial::Smc {
                young_modulus,
                poisson_ratio,
                friction,
                restitution,
                adhesion,
                normal_stiffness,
                normal_damping,
            } => vec![
                young_modulus,
                poisson_ratio,
                friction,
                restitution,
                adhesion,
                normal_stiffness,
                normal_damping,
            ],
        }
    }

    /// Rebuilds a material from the checkpoint field order. `tag`
    /// selects the family; the slice length must match its field count.
    pub fn from_fields(tag: u32, f: &[Real]) -> Option<Self> {
        match (tag, f.len()) {
            (0, 8) => Some(ContactMaterial::Nsc {
                friction: f[0],
                rolling_friction: f[1],
                spinning_friction: f[2],
                restitution: f[3],
                cohesion: f[4],
                compliance: f[5],
                compliance_tangential: f[6],
                damping: f[7],
            }),
            (1, 7) => Some(ContactMaterial::Smc {
                young_modulus: f[0],
                poisson_ratio: f[1],
                friction: f[2],
                restitution: f[3],
                adhesion: f[4],
                normal_stiffness: f[5],
                normal_damping: f[6],
            }),
            _ => None,
        }
    }
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self::default_nsc()
    }
}
