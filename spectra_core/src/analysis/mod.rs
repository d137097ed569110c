//! # Analyses
//!
//! Each analysis follows the same pattern:
//!
//! - `*Input` - label, material reference and [`SequenceOptions`] (JSON-serializable)
//! - `*Result` - results stamped with an id, the requester and a completion time
//! - `calculate(input, spectrum, context[, runner])` - validates, then computes
//!
//! ## Available Analyses
//!
//! - [`equivalent_stress`] - damage and equivalent stress of the full or fast sequence
//! - [`contribution`] - damage split into named loadcase groups and the GAG cycle
//! - [`damage_angle`] - damage over a range of rotation angles, with the critical angle
//!
//! Fan-out analyses take a [`UnitRunner`]; [`Sequential`] runs units in order
//! on the calling thread.

pub mod contribution;
pub mod damage_angle;
pub mod equivalent_stress;
pub mod runner;

pub use contribution::{
    ContributionKind, DamageContribution, DamageContributionResult, LoadcaseDamageContributionInput,
    LoadcaseDamageContributionResult,
};
pub use damage_angle::{AnglePoint, AngleRange, DamageAngleInput, DamageAngleResult};
pub use equivalent_stress::{EquivalentStressInput, EquivalentStressResult, FastEquivalentStressInput, SequenceKind};
pub use runner::{Sequential, UnitRunner};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::damage::{DamageAccumulator, DamageSummary};
use crate::errors::{FatigueError, FatigueResult};
use crate::materials::{Material, MaterialLibrary, MaterialRef};
use crate::sequence::{SequenceOptions, StressSequence};
use crate::spectrum::Spectrum;

/// Collaborators handed to every analysis
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub materials: &'a dyn MaterialLibrary,
    /// User the results are attributed to
    pub requested_by: &'a str,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(materials: &'a dyn MaterialLibrary, requested_by: &'a str) -> Self {
        AnalysisContext {
            materials,
            requested_by,
        }
    }
}

impl std::fmt::Debug for AnalysisContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("requested_by", &self.requested_by)
            .finish_non_exhaustive()
    }
}

/// Identification shared by every analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStamp {
    pub analysis_id: Uuid,
    pub label: String,
    pub material: MaterialRef,
    pub requested_by: String,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisStamp {
    pub fn new(label: &str, material: &MaterialRef, context: &AnalysisContext<'_>) -> Self {
        AnalysisStamp {
            analysis_id: Uuid::new_v4(),
            label: label.to_string(),
            material: material.clone(),
            requested_by: context.requested_by.to_string(),
            completed_at: Utc::now(),
        }
    }
}

/// Label and sequence option checks shared by every input
pub(crate) fn validate_common(label: &str, options: &SequenceOptions, spectrum: &Spectrum) -> FatigueResult<()> {
    if label.trim().is_empty() {
        return Err(FatigueError::missing_field("label"));
    }
    options.validate(spectrum)
}

/// Spectrum checks, then the material lookup
pub(crate) fn prepare(material: &MaterialRef, spectrum: &Spectrum, context: &AnalysisContext<'_>) -> FatigueResult<Material> {
    spectrum.validate()?;
    material.resolve(context.materials)
}

/// Damage of a set of flight sequences, each weighted by its validity
pub(crate) fn spectrum_damage(
    sequences: &[StressSequence],
    material: &Material,
    options: &SequenceOptions,
) -> FatigueResult<DamageSummary> {
    let mut accumulator = DamageAccumulator::new(material, options.omission_level, options.apply_omission);
    for sequence in sequences {
        accumulator.add_sequence(&sequence.stresses(), sequence.validity);
    }
    finite_damage(accumulator.finish(), material)
}

/// Reject a summary the material curve drove to infinity or NaN
pub(crate) fn finite_damage(summary: DamageSummary, material: &Material) -> FatigueResult<DamageSummary> {
    if !summary.damage.is_finite() || summary.equivalent_stress.is_some_and(|s| !s.is_finite()) {
        return Err(FatigueError::calculation_failed(
            material.analysis_type().display_name(),
            format!("damage of material '{}' is not finite", material.name()),
        ));
    }
    Ok(summary)
}

/// Any analysis input, as stored in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisItem {
    EquivalentStress(EquivalentStressInput),
    FastEquivalentStress(FastEquivalentStressInput),
    LoadcaseDamageContribution(LoadcaseDamageContributionInput),
    DamageAngle(DamageAngleInput),
}

impl AnalysisItem {
    /// Get the user-provided label for this analysis
    pub fn label(&self) -> &str {
        match self {
            AnalysisItem::EquivalentStress(i) => &i.label,
            AnalysisItem::FastEquivalentStress(i) => &i.label,
            AnalysisItem::LoadcaseDamageContribution(i) => &i.label,
            AnalysisItem::DamageAngle(i) => &i.label,
        }
    }

    /// Get the analysis type as a string
    pub fn analysis_kind(&self) -> &'static str {
        match self {
            AnalysisItem::EquivalentStress(_) => "EquivalentStress",
            AnalysisItem::FastEquivalentStress(_) => "FastEquivalentStress",
            AnalysisItem::LoadcaseDamageContribution(_) => "LoadcaseDamageContribution",
            AnalysisItem::DamageAngle(_) => "DamageAngle",
        }
    }

    pub fn material(&self) -> &MaterialRef {
        match self {
            AnalysisItem::EquivalentStress(i) => &i.material,
            AnalysisItem::FastEquivalentStress(i) => &i.material,
            AnalysisItem::LoadcaseDamageContribution(i) => &i.material,
            AnalysisItem::DamageAngle(i) => &i.material,
        }
    }

    /// Configuration checks of the input against the spectrum, without the
    /// material library or any computation
    pub fn validate(&self, spectrum: &Spectrum) -> FatigueResult<()> {
        match self {
            AnalysisItem::EquivalentStress(i) => i.validate(spectrum),
            AnalysisItem::FastEquivalentStress(i) => i.validate(spectrum),
            AnalysisItem::LoadcaseDamageContribution(i) => i.validate(spectrum),
            AnalysisItem::DamageAngle(i) => i.validate(spectrum),
        }
    }

    /// Run the analysis; sub-units go through `runner`
    pub fn run<R: UnitRunner>(
        &self,
        spectrum: &Spectrum,
        context: &AnalysisContext<'_>,
        runner: &R,
    ) -> FatigueResult<AnalysisOutcome> {
        let span = tracing::info_span!("analysis", kind = self.analysis_kind(), label = %self.label());
        let _guard = span.enter();
        Ok(match self {
            AnalysisItem::EquivalentStress(i) => {
                AnalysisOutcome::EquivalentStress(equivalent_stress::calculate(i, spectrum, context)?)
            }
            AnalysisItem::FastEquivalentStress(i) => {
                AnalysisOutcome::EquivalentStress(equivalent_stress::calculate_fast(i, spectrum, context)?)
            }
            AnalysisItem::LoadcaseDamageContribution(i) => {
                AnalysisOutcome::LoadcaseDamageContribution(contribution::calculate(i, spectrum, context, runner)?)
            }
            AnalysisItem::DamageAngle(i) => {
                AnalysisOutcome::DamageAngle(damage_angle::calculate(i, spectrum, context, runner)?)
            }
        })
    }
}

/// Result of any analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisOutcome {
    EquivalentStress(EquivalentStressResult),
    LoadcaseDamageContribution(LoadcaseDamageContributionResult),
    DamageAngle(DamageAngleResult),
}

impl AnalysisOutcome {
    pub fn stamp(&self) -> &AnalysisStamp {
        match self {
            AnalysisOutcome::EquivalentStress(r) => &r.stamp,
            AnalysisOutcome::LoadcaseDamageContribution(r) => &r.stamp,
            AnalysisOutcome::DamageAngle(r) => &r.stamp,
        }
    }
}
