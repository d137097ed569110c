//! # Damage Angle Search
//!
//! Evaluates the damage of the spectrum with stresses rotated to every angle
//! `start, start + increment, ...` up to and including `end`, and reports
//! the angle with the highest damage. Each angle is an independent unit with
//! its own projected 1g stresses.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "label": "Skin panel",
//!   "material": { "name": "2024-T351", "analysis_type": "Fatigue" },
//!   "range": { "start_deg": 0.0, "end_deg": 180.0, "increment_deg": 15.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{prepare, spectrum_damage, validate_common, AnalysisContext, AnalysisStamp, UnitRunner};
use crate::errors::{FatigueError, FatigueResult};
use crate::materials::MaterialRef;
use crate::sequence::{SequenceOptions, StressSequenceBuilder};
use crate::spectrum::Spectrum;
use crate::stress::StressProjection;
use crate::units::{Degrees, Radians};

/// Upper bound on evaluated angles
pub const MAX_ANGLE_STEPS: usize = 100_000;

/// Tolerance on the step count, absorbs rounding of `(end - start) / increment`
const STEP_TOLERANCE: f64 = 1e-9;

/// Scanned angles, written in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    #[serde(rename = "start_deg", with = "crate::units::as_degrees")]
    pub start: Radians,
    #[serde(rename = "end_deg", with = "crate::units::as_degrees")]
    pub end: Radians,
    #[serde(rename = "increment_deg", with = "crate::units::as_degrees")]
    pub increment: Radians,
}

impl AngleRange {
    pub fn from_degrees(start: f64, end: f64, increment: f64) -> Self {
        AngleRange {
            start: Degrees(start).into(),
            end: Degrees(end).into(),
            increment: Degrees(increment).into(),
        }
    }

    fn error(&self, reason: &str) -> FatigueError {
        FatigueError::InvalidAngleRange {
            start_deg: Degrees::from(self.start).rounded().0,
            end_deg: Degrees::from(self.end).rounded().0,
            increment_deg: Degrees::from(self.increment).rounded().0,
            reason: reason.to_string(),
        }
    }

    pub fn validate(&self) -> FatigueResult<()> {
        if !self.start.0.is_finite() || !self.end.0.is_finite() || !self.increment.0.is_finite() {
            return Err(self.error("Angles must be finite"));
        }
        if self.start.0 > self.end.0 {
            return Err(self.error("Start angle is greater than end angle"));
        }
        if self.start.0 < self.end.0 && self.increment.0 <= 0.0 {
            return Err(self.error("Increment must be positive"));
        }
        if self.step_count() > MAX_ANGLE_STEPS {
            return Err(self.error("Too many angles to evaluate"));
        }
        Ok(())
    }

    /// Number of evaluated angles; 1 when start equals end
    pub fn step_count(&self) -> usize {
        if self.start.0 >= self.end.0 {
            return 1;
        }
        let steps = ((self.end.0 - self.start.0) / self.increment.0 + STEP_TOLERANCE).floor();
        if steps.is_finite() && steps >= 0.0 {
            (steps as usize).saturating_add(1)
        } else {
            usize::MAX
        }
    }

    pub fn angle(&self, step: usize) -> Radians {
        Radians(self.start.0 + step as f64 * self.increment.0)
    }

    pub fn angles(&self) -> Vec<Radians> {
        (0..self.step_count()).map(|i| self.angle(i)).collect()
    }
}

/// Damage angle analysis input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageAngleInput {
    /// User-defined label for this analysis
    pub label: String,
    pub material: MaterialRef,
    /// Component selection is ignored: every angle uses the rotated normal stress
    #[serde(default)]
    pub options: SequenceOptions,
    pub range: AngleRange,
}

impl DamageAngleInput {
    /// Checks that do not need the material library
    pub fn validate(&self, spectrum: &Spectrum) -> FatigueResult<()> {
        validate_common(&self.label, &self.options, spectrum)?;
        self.range.validate()
    }
}

/// Damage at one angle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnglePoint {
    #[serde(rename = "angle_deg", with = "crate::units::as_degrees")]
    pub angle: Radians,
    pub damage: Option<f64>,
    pub equivalent_stress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FatigueError>,
}

impl AnglePoint {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Damage angle results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageAngleResult {
    #[serde(flatten)]
    pub stamp: AnalysisStamp,
    /// One point per angle, in scan order
    pub points: Vec<AnglePoint>,
    /// Index into `points` of the highest damage (first one on ties)
    pub critical_index: Option<usize>,
}

impl DamageAngleResult {
    pub fn critical(&self) -> Option<&AnglePoint> {
        self.critical_index.and_then(|i| self.points.get(i))
    }

    pub fn critical_angle(&self) -> Option<Degrees> {
        self.critical().map(|p| Degrees::from(p.angle).rounded())
    }
}

/// Index of the first highest damage among successful points
fn arg_max(points: &[AnglePoint]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, point) in points.iter().enumerate() {
        let Some(damage) = point.damage else { continue };
        if best.map_or(true, |(_, b)| damage > b) {
            best = Some((index, damage));
        }
    }
    best.map(|(index, _)| index)
}

/// Run a damage angle search.
pub fn calculate<R: UnitRunner>(
    input: &DamageAngleInput,
    spectrum: &Spectrum,
    context: &AnalysisContext<'_>,
    runner: &R,
) -> FatigueResult<DamageAngleResult> {
    input.validate(spectrum)?;
    let material = prepare(&input.material, spectrum, context)?;
    let angles = input.range.angles();

    let outcomes = runner.run_units(angles.len(), |step| {
        let projection = StressProjection::rotated(angles[step]);
        let sequences = StressSequenceBuilder::with_projection(spectrum, &input.options, projection)?.build_all()?;
        spectrum_damage(&sequences, &material, &input.options)
    });

    let points: Vec<AnglePoint> = outcomes
        .into_iter()
        .zip(&angles)
        .map(|(outcome, angle)| match outcome {
            Ok(summary) => AnglePoint {
                angle: *angle,
                damage: Some(summary.damage),
                equivalent_stress: summary.equivalent_stress,
                failure: None,
            },
            Err(error) => {
                warn!(angle_deg = Degrees::from(*angle).rounded().0, error = %error, "angle failed");
                AnglePoint {
                    angle: *angle,
                    damage: None,
                    equivalent_stress: None,
                    failure: Some(error),
                }
            }
        })
        .collect();

    let critical_index = arg_max(&points);
    info!(
        label = %input.label,
        angles = points.len(),
        critical_deg = ?critical_index.map(|i| Degrees::from(points[i].angle).rounded().0),
        "damage angle search complete"
    );

    Ok(DamageAngleResult {
        stamp: AnalysisStamp::new(&input.label, &input.material, context),
        points,
        critical_index,
    })
}
