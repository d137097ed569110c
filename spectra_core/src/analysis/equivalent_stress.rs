//! # Equivalent Stress
//!
//! Damage and constant-amplitude equivalent stress of the whole spectrum for
//! one material. The full variant synthesizes every peak; the fast variant
//! keeps only the steady level and the increment extremes of each segment.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "label": "Frame 42 / stringer 7",
//!   "material": { "name": "2024-T351", "analysis_type": "Fatigue" },
//!   "options": { "apply_omission": true, "omission_level": 5.0 },
//!   "retain_sequence": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{prepare, spectrum_damage, validate_common, AnalysisContext, AnalysisStamp};
use crate::errors::FatigueResult;
use crate::materials::MaterialRef;
use crate::sequence::{SequenceOptions, StressSequence, StressSequenceBuilder};
use crate::spectrum::Spectrum;

/// Equivalent stress of the full synthesized sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalentStressInput {
    /// User-defined label for this analysis
    pub label: String,
    pub material: MaterialRef,
    #[serde(default)]
    pub options: SequenceOptions,
    /// Keep the synthesized sequences in the result
    #[serde(default)]
    pub retain_sequence: bool,
}

/// Equivalent stress of the per-segment extreme ("fast") sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastEquivalentStressInput {
    /// User-defined label for this analysis
    pub label: String,
    pub material: MaterialRef,
    #[serde(default)]
    pub options: SequenceOptions,
    #[serde(default)]
    pub retain_sequence: bool,
}

impl EquivalentStressInput {
    pub fn new(label: impl Into<String>, material: MaterialRef) -> Self {
        EquivalentStressInput {
            label: label.into(),
            material,
            options: SequenceOptions::default(),
            retain_sequence: false,
        }
    }

    /// Checks that do not need the material library
    pub fn validate(&self, spectrum: &Spectrum) -> FatigueResult<()> {
        validate_common(&self.label, &self.options, spectrum)
    }

    /// Same analysis on the fast sequence
    pub fn into_fast(self) -> FastEquivalentStressInput {
        FastEquivalentStressInput {
            label: self.label,
            material: self.material,
            options: self.options,
            retain_sequence: self.retain_sequence,
        }
    }
}

impl FastEquivalentStressInput {
    /// Checks that do not need the material library
    pub fn validate(&self, spectrum: &Spectrum) -> FatigueResult<()> {
        validate_common(&self.label, &self.options, spectrum)
    }
}

/// Which sequence a result was computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceKind {
    Full,
    Fast,
}

/// Equivalent stress results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalentStressResult {
    #[serde(flatten)]
    pub stamp: AnalysisStamp,
    pub sequence_kind: SequenceKind,
    pub damage: f64,
    /// `None` when no cycle survived omission
    pub equivalent_stress: Option<f64>,
    pub cycle_count: f64,
    pub flight_count: usize,
    /// Number of synthesized peaks over all flights
    pub peak_count: usize,
    /// Per-flight sequences, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequences: Option<Vec<StressSequence>>,
}

/// Run an equivalent stress analysis on the full sequence.
///
/// # Example
///
/// ```rust
/// use spectra_core::analysis::{equivalent_stress, AnalysisContext, EquivalentStressInput};
/// use spectra_core::materials::{AnalysisType, FatigueMaterial, InMemoryMaterialLibrary, Material, MaterialRef};
/// use spectra_core::spectrum::Spectrum;
///
/// let library = InMemoryMaterialLibrary::new().with_material(Material::Fatigue(FatigueMaterial {
///     name: "2024-T351".to_string(),
///     specification: String::new(),
///     slope: 4.0,
///     mean_stress_exponent: 0.5,
///     reference_stress: 100.0,
///     reference_cycles: 1e6,
/// }));
/// let input = EquivalentStressInput::new("empty", MaterialRef::new("2024-T351", AnalysisType::Fatigue));
/// let result = equivalent_stress::calculate(&input, &Spectrum::default(), &AnalysisContext::new(&library, "doc"))
///     .unwrap();
///
/// assert_eq!(result.damage, 0.0);
/// assert_eq!(result.equivalent_stress, None);
/// ```
pub fn calculate(
    input: &EquivalentStressInput,
    spectrum: &Spectrum,
    context: &AnalysisContext<'_>,
) -> FatigueResult<EquivalentStressResult> {
    run(
        &input.label,
        &input.material,
        &input.options,
        input.retain_sequence,
        SequenceKind::Full,
        spectrum,
        context,
    )
}

/// Run an equivalent stress analysis on the fast sequence
pub fn calculate_fast(
    input: &FastEquivalentStressInput,
    spectrum: &Spectrum,
    context: &AnalysisContext<'_>,
) -> FatigueResult<EquivalentStressResult> {
    run(
        &input.label,
        &input.material,
        &input.options,
        input.retain_sequence,
        SequenceKind::Fast,
        spectrum,
        context,
    )
}

fn run(
    label: &str,
    material_ref: &MaterialRef,
    options: &SequenceOptions,
    retain_sequence: bool,
    kind: SequenceKind,
    spectrum: &Spectrum,
    context: &AnalysisContext<'_>,
) -> FatigueResult<EquivalentStressResult> {
    validate_common(label, options, spectrum)?;
    let material = prepare(material_ref, spectrum, context)?;

    let builder = StressSequenceBuilder::new(spectrum, options)?;
    let sequences = match kind {
        SequenceKind::Full => builder.build_all()?,
        SequenceKind::Fast => builder.build_all_fast()?,
    };
    let summary = spectrum_damage(&sequences, &material, options)?;
    let peak_count = sequences.iter().map(StressSequence::len).sum();

    info!(
        label,
        material = %material_ref.name,
        damage = summary.damage,
        equivalent_stress = ?summary.equivalent_stress,
        "equivalent stress complete"
    );

    Ok(EquivalentStressResult {
        stamp: AnalysisStamp::new(label, material_ref, context),
        sequence_kind: kind,
        damage: summary.damage,
        equivalent_stress: summary.equivalent_stress,
        cycle_count: summary.cycle_count,
        flight_count: sequences.len(),
        peak_count,
        sequences: retain_sequence.then_some(sequences),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use crate::materials::AnalysisType;

    fn input() -> EquivalentStressInput {
        EquivalentStressInput::new("fixture", fixtures::material())
    }

    #[test]
    fn test_full_sequence_damage() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let result = calculate(&input(), &fixtures::spectrum(), &ctx).unwrap();
        assert_eq!(result.sequence_kind, SequenceKind::Full);
        assert_eq!(result.flight_count, 1);
        assert_eq!(result.peak_count, 5);
        assert!(result.damage > 0.0);
        assert!(result.equivalent_stress.is_some());
        assert!(result.sequences.is_none());
        assert_eq!(result.stamp.requested_by, "tester");
    }

    #[test]
    fn test_retained_sequence() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let mut i = input();
        i.retain_sequence = true;
        let result = calculate(&i, &fixtures::spectrum(), &ctx).unwrap();
        let sequences = result.sequences.unwrap();
        // 1g sx 60; gust sx 10 × 3
        assert!((sequences[0].peaks[0].total - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_fast_sequence() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let result = calculate_fast(&input().into_fast(), &fixtures::spectrum(), &ctx).unwrap();
        assert_eq!(result.sequence_kind, SequenceKind::Fast);
        // climb: steady + 2 extremes; cruise: steady + 3 extremes
        assert_eq!(result.peak_count, 7);
        assert!(result.damage > 0.0);
    }

    #[test]
    fn test_omission_removes_everything() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let mut i = input();
        i.options.apply_omission = true;
        i.options.omission_level = 1.0e6;
        let result = calculate(&i, &fixtures::spectrum(), &ctx).unwrap();
        assert_eq!(result.damage, 0.0);
        assert_eq!(result.equivalent_stress, None);
    }

    #[test]
    fn test_configuration_errors() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let spectrum = fixtures::spectrum();

        let mut unknown = input();
        unknown.material = MaterialRef::new(fixtures::MATERIAL, AnalysisType::Preffas);
        assert_eq!(calculate(&unknown, &spectrum, &ctx).unwrap_err().error_code(), "MATERIAL_NOT_FOUND");

        let mut unlabeled = input();
        unlabeled.label = " ".to_string();
        assert_eq!(calculate(&unlabeled, &spectrum, &ctx).unwrap_err().error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_json_roundtrip() {
        let json = r#"{
            "label": "L",
            "material": { "name": "2024-T351", "analysis_type": "Fatigue" },
            "options": { "component": "Rotated", "rotation_angle_deg": 45.0 }
        }"#;
        let i: EquivalentStressInput = serde_json::from_str(json).unwrap();
        assert!((i.options.rotation_angle.0 - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert!(!i.retain_sequence);
    }

    #[test]
    fn test_non_finite_damage_fails() {
        use crate::materials::{FatigueMaterial, InMemoryMaterialLibrary, Material};

        let lib = InMemoryMaterialLibrary::new().with_material(Material::Fatigue(FatigueMaterial {
            name: fixtures::MATERIAL.to_string(),
            specification: String::new(),
            slope: 400.0,
            mean_stress_exponent: 0.5,
            reference_stress: 1.0,
            reference_cycles: 1.0,
        }));
        let ctx = AnalysisContext::new(&lib, "tester");
        let err = calculate(&input(), &fixtures::spectrum(), &ctx).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
        assert!(!err.is_configuration_error());
    }
}
