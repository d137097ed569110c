//! # Unit Types
//!
//! Type-safe wrappers for the angle units used by stress rotation. Users
//! enter angles in degrees; the engine works in radians. The conversion
//! happens once, when an input is built or deserialized.
//!
//! Stresses and pressures are plain `f64` in whatever consistent unit system
//! the spectrum was prepared in (MPa/bar or ksi/psi); the engine never mixes
//! them.
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::units::{Degrees, Radians};
//!
//! let angle: Radians = Degrees(90.0).into();
//! assert!((angle.0 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//!
//! let back: Degrees = angle.into();
//! assert!((back.0 - 90.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Angle Units
// ============================================================================

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(pub f64);

impl From<Degrees> for Radians {
    fn from(deg: Degrees) -> Self {
        Radians(deg.0.to_radians())
    }
}

impl From<Radians> for Degrees {
    fn from(rad: Radians) -> Self {
        Degrees(rad.0.to_degrees())
    }
}

impl Radians {
    /// Zero rotation
    pub const ZERO: Radians = Radians(0.0);

    /// `(sin, cos)` of the angle
    pub fn sin_cos(self) -> (f64, f64) {
        self.0.sin_cos()
    }
}

/// Decimal places kept when an angle is written back in degrees
const DEGREE_DECIMALS: i32 = 9;

impl Degrees {
    /// Drop the noise of a degree -> radian -> degree round trip
    pub fn rounded(self) -> Degrees {
        let scale = 10f64.powi(DEGREE_DECIMALS);
        let scaled = self.0 * scale;
        if scaled.is_finite() {
            Degrees(scaled.round() / scale)
        } else {
            self
        }
    }
}

impl std::fmt::Display for Degrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} deg", self.0)
    }
}

/// Serde adapter storing a [`Radians`] field as degrees in JSON.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use spectra_core::units::Radians;
///
/// #[derive(Serialize, Deserialize)]
/// struct Rotation {
///     #[serde(with = "spectra_core::units::as_degrees")]
///     angle_deg: Radians,
/// }
///
/// let r: Rotation = serde_json::from_str(r#"{ "angle_deg": 180.0 }"#).unwrap();
/// assert!((r.angle_deg.0 - std::f64::consts::PI).abs() < 1e-12);
/// ```
pub mod as_degrees {
    use super::{Degrees, Radians};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(angle: &Radians, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(Degrees::from(*angle).rounded().0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Radians, D::Error> {
        let deg = f64::deserialize(deserializer)?;
        Ok(Degrees(deg).into())
    }
}
