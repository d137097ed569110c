//! S-N fatigue material.
//!
//! Cycles are reduced to a Walker equivalent amplitude and damage follows a
//! Basquin curve with Miner's linear summation:
//!
//! ```text
//! σeq = σmax^(1-γ) · σa^γ          (0 when σmax ≤ 0)
//! N(σeq) = Nref · (σref / σeq)^p
//! d = 1 / N(σeq)
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};

/// S-N curve parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueMaterial {
    pub name: String,
    #[serde(default)]
    pub specification: String,
    /// Basquin exponent p
    pub slope: f64,
    /// Walker exponent γ in [0, 1]; 0.5 gives the Smith-Watson-Topper form
    pub mean_stress_exponent: f64,
    /// Equivalent amplitude σref at which the curve gives `reference_cycles`
    pub reference_stress: f64,
    pub reference_cycles: f64,
}

impl FatigueMaterial {
    pub fn validate(&self) -> FatigueResult<()> {
        if self.name.trim().is_empty() {
            return Err(FatigueError::missing_field("material.name"));
        }
        if !(self.slope > 0.0) {
            return Err(FatigueError::invalid_input(
                "slope",
                self.slope.to_string(),
                "S-N slope must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.mean_stress_exponent) {
            return Err(FatigueError::invalid_input(
                "mean_stress_exponent",
                self.mean_stress_exponent.to_string(),
                "Walker exponent must be between 0 and 1",
            ));
        }
        if !(self.reference_stress > 0.0) || !(self.reference_cycles > 0.0) {
            return Err(FatigueError::invalid_input(
                "reference_stress/reference_cycles",
                format!("{}/{}", self.reference_stress, self.reference_cycles),
                "Reference point of the S-N curve must be positive",
            ));
        }
        Ok(())
    }

    /// Walker equivalent amplitude of a cycle
    pub fn equivalent_amplitude(&self, max: f64, min: f64) -> f64 {
        if max <= 0.0 {
            return 0.0;
        }
        let amplitude = (max - min).abs() / 2.0;
        let gamma = self.mean_stress_exponent;
        max.powf(1.0 - gamma) * amplitude.powf(gamma)
    }

    /// Miner damage of one cycle at equivalent amplitude `s_eq`
    pub fn damage_per_cycle(&self, s_eq: f64) -> f64 {
        if s_eq <= 0.0 {
            return 0.0;
        }
        (s_eq / self.reference_stress).powf(self.slope) / self.reference_cycles
    }
}
