//! Options shared by every analysis that synthesizes a stress sequence.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "apply_omission": true,
//!   "omission_level": 5.0,
//!   "remove_negative_stresses": false,
//!   "component": "Rotated",
//!   "rotation_angle_deg": 30.0,
//!   "delta_p": { "issy_code": 2000, "reference_pressure": 0.61 },
//!   "delta_t": { "mode": "TwoPoints",
//!                "inferior": { "issy_code": 3001, "reference_temperature": -40.0 },
//!                "superior": { "issy_code": 3002, "reference_temperature": 60.0 } },
//!   "segment_factors": [],
//!   "loadcase_factors": [],
//!   "overall_modifier": { "method": "MULTIPLY", "value": 1.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};
use crate::interpolation::{DeltaPRatio, DeltaTInterpolator, DtReference};
use crate::modifiers::{LoadcaseFactor, SegmentFactor, StressModifier, StressModifierResolver};
use crate::spectrum::Spectrum;
use crate::stress::{StressComponent, StressProjection};
use crate::units::Radians;

/// Delta-P loadcase and the pressure its stress was computed at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaPSettings {
    pub issy_code: i32,
    pub reference_pressure: f64,
}

/// One delta-T loadcase and its reference temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DtReferenceSettings {
    pub issy_code: i32,
    pub reference_temperature: f64,
}

/// Delta-T interpolation mode with its loadcase references
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum DeltaTSettings {
    #[default]
    None,
    OnePoint { reference: DtReferenceSettings },
    TwoPoints {
        inferior: DtReferenceSettings,
        superior: DtReferenceSettings,
    },
}

/// Sequence synthesis options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceOptions {
    /// Drop cycles whose range is below `omission_level`
    pub apply_omission: bool,
    pub omission_level: f64,
    /// Clamp negative total stresses to zero
    pub remove_negative_stresses: bool,
    pub component: StressComponent,
    /// Stored in radians, written in degrees
    #[serde(rename = "rotation_angle_deg", with = "crate::units::as_degrees")]
    pub rotation_angle: Radians,
    pub delta_p: Option<DeltaPSettings>,
    pub delta_t: DeltaTSettings,
    pub segment_factors: Vec<SegmentFactor>,
    pub loadcase_factors: Vec<LoadcaseFactor>,
    /// Applied to every total stress before negative removal
    pub overall_modifier: StressModifier,
}

impl SequenceOptions {
    pub fn projection(&self) -> StressProjection {
        StressProjection::new(self.component, self.rotation_angle)
    }

    pub fn resolver(&self) -> StressModifierResolver {
        StressModifierResolver::new(&self.segment_factors, &self.loadcase_factors)
    }

    /// Configuration checks against the spectrum, before any computation
    pub fn validate(&self, spectrum: &Spectrum) -> FatigueResult<()> {
        if !self.omission_level.is_finite() || self.omission_level < 0.0 {
            return Err(FatigueError::invalid_input(
                "omission_level",
                self.omission_level.to_string(),
                "Omission level must be a finite, non-negative stress range",
            ));
        }
        if !self.rotation_angle.0.is_finite() {
            return Err(FatigueError::invalid_input(
                "rotation_angle_deg",
                self.rotation_angle.0.to_string(),
                "Rotation angle must be finite",
            ));
        }
        if !self.overall_modifier.value.is_finite() {
            return Err(FatigueError::invalid_input(
                "overall_modifier",
                self.overall_modifier.to_string(),
                "Modifier value must be finite",
            ));
        }
        if let Some(dp) = &self.delta_p {
            if !dp.reference_pressure.is_finite() {
                return Err(FatigueError::invalid_input(
                    "delta_p.reference_pressure",
                    dp.reference_pressure.to_string(),
                    "Reference pressure must be finite",
                ));
            }
            if !spectrum.delta_p_cases.contains(dp.issy_code) {
                return Err(FatigueError::unknown_loadcase("delta-P", dp.issy_code));
            }
        }
        for reference in self.dt_references() {
            if !reference.reference_temperature.is_finite() {
                return Err(FatigueError::invalid_input(
                    "delta_t.reference_temperature",
                    reference.reference_temperature.to_string(),
                    "Reference temperature must be finite",
                ));
            }
            if !spectrum.delta_t_cases.contains(reference.issy_code) {
                return Err(FatigueError::unknown_loadcase("delta-T", reference.issy_code));
            }
        }
        self.resolver().validate(spectrum)
    }

    fn dt_references(&self) -> Vec<DtReferenceSettings> {
        match self.delta_t {
            DeltaTSettings::None => vec![],
            DeltaTSettings::OnePoint { reference } => vec![reference],
            DeltaTSettings::TwoPoints { inferior, superior } => vec![inferior, superior],
        }
    }

    /// Pressure ratio with the reference stress projected for this analysis
    pub fn delta_p_ratio(&self, spectrum: &Spectrum, projection: StressProjection) -> FatigueResult<DeltaPRatio> {
        match &self.delta_p {
            None => Ok(DeltaPRatio::none()),
            Some(dp) => {
                let case = spectrum
                    .delta_p_cases
                    .get(dp.issy_code)
                    .ok_or_else(|| FatigueError::unknown_loadcase("delta-P", dp.issy_code))?;
                Ok(DeltaPRatio::new(dp.reference_pressure, projection.project(&case.stress)))
            }
        }
    }

    /// Temperature interpolator with the reference stresses projected for this analysis
    pub fn delta_t_interpolator(
        &self,
        spectrum: &Spectrum,
        projection: StressProjection,
    ) -> FatigueResult<DeltaTInterpolator> {
        let reference = |settings: &DtReferenceSettings| -> FatigueResult<DtReference> {
            let case = spectrum
                .delta_t_cases
                .get(settings.issy_code)
                .ok_or_else(|| FatigueError::unknown_loadcase("delta-T", settings.issy_code))?;
            Ok(DtReference::new(
                case.event.clone(),
                settings.issy_code,
                projection.project(&case.stress),
                settings.reference_temperature,
            ))
        };
        Ok(match &self.delta_t {
            DeltaTSettings::None => DeltaTInterpolator::None,
            DeltaTSettings::OnePoint { reference: r } => DeltaTInterpolator::one_point(reference(r)?),
            DeltaTSettings::TwoPoints { inferior, superior } => {
                DeltaTInterpolator::two_points(reference(inferior)?, reference(superior)?)
            }
        })
    }
}
