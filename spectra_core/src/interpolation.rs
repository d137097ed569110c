//! # Delta-P and Delta-T Interpolation
//!
//! Pressure and temperature stresses are delivered as a stress at a reference
//! condition. These types turn a reference into a linear function of the
//! peak's actual delta-P / delta-T.
//!
//! Every function here is defined for all real inputs: a zero reference (or
//! coincident reference temperatures) yields a zero slope instead of a
//! division by zero.
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::interpolation::{DeltaPRatio, DeltaTInterpolator, DtReference};
//!
//! let dp = DeltaPRatio::new(100.0, 20.0);
//! assert!((dp.stress(50.0) - 10.0).abs() < 1e-12);
//!
//! let dt = DeltaTInterpolator::two_points(
//!     DtReference::new("COLD", 3001, -12.0, -40.0),
//!     DtReference::new("HOT", 3002, 18.0, 60.0),
//! );
//! assert_eq!(dt.stress(-40.0), -12.0);
//! assert_eq!(dt.stress(60.0), 18.0);
//! ```

use serde::{Deserialize, Serialize};

/// Linear pressure stress through the origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeltaPRatio {
    pub reference_pressure: f64,
    pub reference_stress: f64,
    /// stress / reference pressure (0 when the reference pressure is 0)
    pub ratio: f64,
}

impl DeltaPRatio {
    pub fn new(reference_pressure: f64, reference_stress: f64) -> Self {
        let ratio = if reference_pressure == 0.0 {
            0.0
        } else {
            reference_stress / reference_pressure
        };
        DeltaPRatio {
            reference_pressure,
            reference_stress,
            ratio,
        }
    }

    /// No pressure contribution
    pub fn none() -> Self {
        DeltaPRatio::new(0.0, 0.0)
    }

    pub fn stress(&self, delta_p: f64) -> f64 {
        self.ratio * delta_p
    }
}

/// Delta-T loadcase stress at a reference temperature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtReference {
    pub event: String,
    pub issy_code: i32,
    pub stress: f64,
    pub reference_temperature: f64,
}

impl DtReference {
    pub fn new(event: impl Into<String>, issy_code: i32, stress: f64, reference_temperature: f64) -> Self {
        DtReference {
            event: event.into(),
            issy_code,
            stress,
            reference_temperature,
        }
    }
}

/// Temperature stress as a function of delta-T
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum DeltaTInterpolator {
    /// No temperature contribution
    #[default]
    None,
    /// Linear through the origin and one reference
    OnePoint { reference: DtReference, ratio: f64 },
    /// Linear through an inferior and a superior reference
    TwoPoints {
        inferior: DtReference,
        superior: DtReference,
        slope: f64,
    },
}

impl DeltaTInterpolator {
    pub fn one_point(reference: DtReference) -> Self {
        let ratio = if reference.reference_temperature == 0.0 {
            0.0
        } else {
            reference.stress / reference.reference_temperature
        };
        DeltaTInterpolator::OnePoint { reference, ratio }
    }

    pub fn two_points(inferior: DtReference, superior: DtReference) -> Self {
        let denominator = inferior.reference_temperature - superior.reference_temperature;
        let slope = if denominator == 0.0 {
            0.0
        } else {
            (inferior.stress - superior.stress) / denominator
        };
        DeltaTInterpolator::TwoPoints {
            inferior,
            superior,
            slope,
        }
    }

    /// Stress for a delta-T; reproduces the reference stresses exactly
    pub fn stress(&self, delta_t: f64) -> f64 {
        match self {
            DeltaTInterpolator::None => 0.0,
            DeltaTInterpolator::OnePoint { ratio, .. } => ratio * delta_t,
            DeltaTInterpolator::TwoPoints {
                inferior,
                superior,
                slope,
            } => {
                if delta_t == inferior.reference_temperature && *slope != 0.0 {
                    inferior.stress
                } else {
                    slope * (delta_t - superior.reference_temperature) + superior.stress
                }
            }
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            DeltaTInterpolator::None => "None",
            DeltaTInterpolator::OnePoint { .. } => "OnePoint",
            DeltaTInterpolator::TwoPoints { .. } => "TwoPoints",
        }
    }
}
