//! # Stress States and Component Selection
//!
//! Spectra carry either scalar (1-axis) stresses or plane-stress components
//! `(sx, sy, sxy)`. An analysis reduces every stress to one scalar through a
//! [`StressProjection`]: a selected component, or the normal stress along a
//! rotated axis.
//!
//! The rotated normal stress uses the plane-stress transform:
//!
//! ```text
//! σθ = sx·cos²θ + sy·sin²θ + 2·sxy·sinθ·cosθ
//! ```
//!
//! Scalar stresses are already reduced; projection returns them unchanged.
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::stress::{PlaneStress, StressComponent, StressProjection, StressState};
//! use spectra_core::units::Degrees;
//!
//! let state = StressState::Tensor(PlaneStress::new(100.0, 20.0, 0.0));
//! let along_y = StressProjection::rotated(Degrees(90.0).into());
//! assert!((along_y.project(&state) - 20.0).abs() < 1e-9);
//!
//! // Scalar spectra ignore rotation
//! let scalar = StressState::Scalar(42.0);
//! assert_eq!(along_y.project(&scalar), 42.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::units::Radians;

/// Plane stress tensor components
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneStress {
    /// Normal stress along x
    pub sx: f64,
    /// Normal stress along y
    pub sy: f64,
    /// In-plane shear stress
    pub sxy: f64,
}

impl PlaneStress {
    pub fn new(sx: f64, sy: f64, sxy: f64) -> Self {
        PlaneStress { sx, sy, sxy }
    }

    /// Normal stress on the axis rotated by `angle` from x
    pub fn normal_at(&self, angle: Radians) -> f64 {
        let (s, c) = angle.sin_cos();
        self.sx * c * c + self.sy * s * s + 2.0 * self.sxy * s * c
    }

    /// Scale every component (unit stresses times a load factor)
    pub fn scaled(&self, factor: f64) -> Self {
        PlaneStress::new(self.sx * factor, self.sy * factor, self.sxy * factor)
    }
}

/// Stress carried by a loadcase: a scalar for 1-axis spectra, or components.
///
/// Serialized untagged: `12.5` or `{ "sx": 1.0, "sy": 2.0, "sxy": 0.5 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StressState {
    Scalar(f64),
    Tensor(PlaneStress),
}

impl Default for StressState {
    fn default() -> Self {
        StressState::Scalar(0.0)
    }
}

/// Stress component selected by an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StressComponent {
    /// sx (default axis)
    #[default]
    NormalX,
    /// sy
    NormalY,
    /// sxy
    ShearXY,
    /// Normal stress along the axis rotated by the analysis angle
    Rotated,
}

impl StressComponent {
    pub fn display_name(&self) -> &'static str {
        match self {
            StressComponent::NormalX => "Normal X",
            StressComponent::NormalY => "Normal Y",
            StressComponent::ShearXY => "Shear XY",
            StressComponent::Rotated => "Rotated",
        }
    }
}

/// Component selection plus rotation angle; reduces a [`StressState`] to a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressProjection {
    pub component: StressComponent,
    pub angle: Radians,
}

impl StressProjection {
    pub fn new(component: StressComponent, angle: Radians) -> Self {
        StressProjection { component, angle }
    }

    /// Normal stress along the axis at `angle`
    pub fn rotated(angle: Radians) -> Self {
        StressProjection::new(StressComponent::Rotated, angle)
    }

    /// Reduce a stress state to the analysed scalar
    pub fn project(&self, state: &StressState) -> f64 {
        match state {
            StressState::Scalar(value) => *value,
            StressState::Tensor(t) => match self.component {
                StressComponent::NormalX => t.sx,
                StressComponent::NormalY => t.sy,
                StressComponent::ShearXY => t.sxy,
                StressComponent::Rotated => t.normal_at(self.angle),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Degrees;

    fn tensor() -> StressState {
        StressState::Tensor(PlaneStress::new(100.0, 40.0, 30.0))
    }

    #[test]
    fn test_component_selection() {
        let state = tensor();
        assert_eq!(StressProjection::new(StressComponent::NormalX, Radians::ZERO).project(&state), 100.0);
        assert_eq!(StressProjection::new(StressComponent::NormalY, Radians::ZERO).project(&state), 40.0);
        assert_eq!(StressProjection::new(StressComponent::ShearXY, Radians::ZERO).project(&state), 30.0);
    }

    #[test]
    fn test_rotation_zero_is_sx() {
        assert_eq!(StressProjection::rotated(Radians::ZERO).project(&tensor()), 100.0);
    }

    #[test]
    fn test_rotation_45_degrees() {
        // (sx + sy)/2 + sxy = 70 + 30
        let p = StressProjection::rotated(Degrees(45.0).into());
        assert!((p.project(&tensor()) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_ignores_component_angle_when_not_rotated() {
        let p = StressProjection::new(StressComponent::NormalX, Degrees(60.0).into());
        assert_eq!(p.project(&tensor()), 100.0);
    }

    #[test]
    fn test_scalar_rotation_is_noop() {
        let p = StressProjection::rotated(Degrees(33.0).into());
        assert_eq!(p.project(&StressState::Scalar(-7.5)), -7.5);
    }

    #[test]
    fn test_untagged_serialization() {
        let scalar: StressState = serde_json::from_str("12.5").unwrap();
        assert_eq!(scalar, StressState::Scalar(12.5));
        let t: StressState = serde_json::from_str(r#"{"sx":1.0,"sy":2.0,"sxy":0.5}"#).unwrap();
        assert_eq!(t, StressState::Tensor(PlaneStress::new(1.0, 2.0, 0.5)));
    }
}
