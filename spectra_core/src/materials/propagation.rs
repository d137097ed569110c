//! Crack propagation material shared by the Preffas and linear models.
//!
//! Crack growth per cycle follows `da/dN = Ceff · Δσeff^m`, with the
//! effective range given by an Elber-type closure function of the stress
//! ratio:
//!
//! ```text
//! U(R) = a + b·R + c·R²     clamped to [0, 1], R clamped to [-1, 1]
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};

/// Propagation curve parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationMaterial {
    pub name: String,
    #[serde(default)]
    pub specification: String,
    /// Growth coefficient
    pub ceff: f64,
    /// Growth exponent
    pub m: f64,
    /// Closure function coefficients
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PropagationMaterial {
    pub fn validate(&self) -> FatigueResult<()> {
        if self.name.trim().is_empty() {
            return Err(FatigueError::missing_field("material.name"));
        }
        if !(self.ceff > 0.0) {
            return Err(FatigueError::invalid_input("ceff", self.ceff.to_string(), "Ceff must be positive"));
        }
        if !(self.m > 0.0) {
            return Err(FatigueError::invalid_input("m", self.m.to_string(), "Exponent m must be positive"));
        }
        if ![self.a, self.b, self.c].iter().all(|v| v.is_finite()) {
            return Err(FatigueError::invalid_input(
                "a/b/c",
                format!("{}/{}/{}", self.a, self.b, self.c),
                "Closure coefficients must be finite",
            ));
        }
        Ok(())
    }

    /// Stress ratio of a cycle, clamped to [-1, 1]; `None` when σmax ≤ 0
    pub fn stress_ratio(max: f64, min: f64) -> Option<f64> {
        if max <= 0.0 {
            return None;
        }
        Some((min / max).clamp(-1.0, 1.0))
    }

    /// Closure function U(R)
    pub fn closure(&self, ratio: f64) -> f64 {
        (self.a + self.b * ratio + self.c * ratio * ratio).clamp(0.0, 1.0)
    }

    /// Crack growth of one cycle with effective range `range_eff`
    pub fn growth_per_cycle(&self, range_eff: f64) -> f64 {
        if range_eff <= 0.0 {
            return 0.0;
        }
        self.ceff * range_eff.powf(self.m)
    }
}
