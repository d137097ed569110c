//! # Loadcase Damage Contribution
//!
//! Splits the total damage into named sources. The baseline run uses the
//! input's factors as given; each contribution is then evaluated on its own:
//!
//! - **Increment**: every incremental loadcase of the spectrum the
//!   contribution does not list is masked (`MULTIPLY 0`), listed loadcases
//!   take the contribution's modifiers.
//! - **Gag**: the single worst ground-air-ground cycle of the baseline
//!   sequences, applied once per flown flight.
//!
//! Contributions are independent units. A failing unit is reported in its
//! own entry; the others still complete. Results keep the input order.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "label": "Wing root",
//!   "material": { "name": "2024-T351", "analysis_type": "Fatigue" },
//!   "contributions": [
//!     { "name": "Gusts", "kind": { "type": "Increment", "loadcase_factors": [
//!         { "loadcase": 101, "modifier": { "method": "MULTIPLY", "value": 1.0 } } ] } },
//!     { "name": "GAG", "kind": { "type": "Gag" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    finite_damage, prepare, spectrum_damage, validate_common, AnalysisContext, AnalysisStamp, UnitRunner,
};
use crate::damage::{DamageAccumulator, DamageSummary};
use crate::errors::{FatigueError, FatigueResult};
use crate::materials::{Material, MaterialRef};
use crate::modifiers::{merge_loadcase_factors, LoadcaseFactor, LoadcaseKind, StressModifier};
use crate::sequence::{GagEvent, SequenceOptions, StressSequenceBuilder};
use crate::spectrum::Spectrum;

/// What a contribution isolates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContributionKind {
    /// Only the listed incremental loadcases, with these modifiers
    Increment { loadcase_factors: Vec<LoadcaseFactor> },
    /// The worst ground-air-ground cycle
    Gag,
}

/// Named damage source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageContribution {
    pub name: String,
    pub kind: ContributionKind,
}

impl DamageContribution {
    pub fn increment(name: impl Into<String>, loadcase_factors: Vec<LoadcaseFactor>) -> Self {
        DamageContribution {
            name: name.into(),
            kind: ContributionKind::Increment { loadcase_factors },
        }
    }

    pub fn gag(name: impl Into<String>) -> Self {
        DamageContribution {
            name: name.into(),
            kind: ContributionKind::Gag,
        }
    }

    pub fn is_gag(&self) -> bool {
        matches!(self.kind, ContributionKind::Gag)
    }
}

/// Damage contribution analysis input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadcaseDamageContributionInput {
    /// User-defined label for this analysis
    pub label: String,
    pub material: MaterialRef,
    #[serde(default)]
    pub options: SequenceOptions,
    pub contributions: Vec<DamageContribution>,
}

impl LoadcaseDamageContributionInput {
    /// Position of the GAG contribution, if any
    pub fn gag_index(&self) -> Option<usize> {
        self.contributions.iter().position(DamageContribution::is_gag)
    }

    /// Checks that do not need the material library
    pub fn validate(&self, spectrum: &Spectrum) -> FatigueResult<()> {
        validate_common(&self.label, &self.options, spectrum)?;
        let gags = self.contributions.iter().filter(|c| c.is_gag()).count();
        if gags > 1 {
            return Err(FatigueError::invalid_input(
                "contributions",
                format!("{} GAG contributions", gags),
                "At most one GAG contribution is allowed",
            ));
        }
        for (index, contribution) in self.contributions.iter().enumerate() {
            if contribution.name.trim().is_empty() {
                return Err(FatigueError::missing_field(format!("contributions[{}].name", index)));
            }
            if let ContributionKind::Increment { loadcase_factors } = &contribution.kind {
                for factor in loadcase_factors {
                    if factor.kind != LoadcaseKind::Increment {
                        return Err(FatigueError::invalid_input(
                            format!("contributions[{}].loadcase_factors", index),
                            factor.loadcase.to_string(),
                            "Contribution factors must target incremental loadcases",
                        ));
                    }
                    if !factor.modifier.value.is_finite() {
                        return Err(FatigueError::invalid_input(
                            format!("contributions[{}].loadcase_factors", index),
                            factor.modifier.to_string(),
                            "Modifier value must be finite",
                        ));
                    }
                    if !spectrum.increment_cases.contains(factor.loadcase) {
                        return Err(FatigueError::unknown_loadcase("increment", factor.loadcase));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Outcome of one contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageContributionResult {
    pub contribution_index: usize,
    pub name: String,
    pub damage: Option<f64>,
    pub equivalent_stress: Option<f64>,
    /// damage / baseline damage, when the baseline damage is positive
    pub damage_ratio: Option<f64>,
    /// Set when this unit failed; the numeric fields are then `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FatigueError>,
}

impl DamageContributionResult {
    fn completed(index: usize, name: &str, summary: DamageSummary, baseline: &DamageSummary) -> Self {
        DamageContributionResult {
            contribution_index: index,
            name: name.to_string(),
            damage: Some(summary.damage),
            equivalent_stress: summary.equivalent_stress,
            damage_ratio: (baseline.damage > 0.0).then(|| summary.damage / baseline.damage),
            failure: None,
        }
    }

    fn failed(index: usize, name: &str, error: FatigueError) -> Self {
        DamageContributionResult {
            contribution_index: index,
            name: name.to_string(),
            damage: None,
            equivalent_stress: None,
            damage_ratio: None,
            failure: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Damage contribution results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadcaseDamageContributionResult {
    #[serde(flatten)]
    pub stamp: AnalysisStamp,
    /// Damage with the input's factors as given
    pub baseline: DamageSummary,
    /// Worst ground-air-ground cycle of the baseline sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gag: Option<GagEvent>,
    /// One entry per contribution, in input order
    pub contributions: Vec<DamageContributionResult>,
}

impl LoadcaseDamageContributionResult {
    pub fn failures(&self) -> impl Iterator<Item = &DamageContributionResult> {
        self.contributions.iter().filter(|c| !c.is_success())
    }
}

/// Loadcase factors isolating the listed increments: every other increment
/// loadcase of the spectrum is multiplied by zero.
pub fn isolating_factors(
    spectrum: &Spectrum,
    base: &[LoadcaseFactor],
    listed: &[LoadcaseFactor],
) -> Vec<LoadcaseFactor> {
    let mask: Vec<LoadcaseFactor> = spectrum
        .increment_cases
        .codes()
        .into_iter()
        .filter(|code| !listed.iter().any(|f| f.loadcase == *code))
        .map(|code| LoadcaseFactor::new(code, LoadcaseKind::Increment, StressModifier::multiply(0.0)))
        .collect();
    merge_loadcase_factors(&merge_loadcase_factors(base, &mask), listed)
}

/// Run a damage contribution analysis.
pub fn calculate<R: UnitRunner>(
    input: &LoadcaseDamageContributionInput,
    spectrum: &Spectrum,
    context: &AnalysisContext<'_>,
    runner: &R,
) -> FatigueResult<LoadcaseDamageContributionResult> {
    input.validate(spectrum)?;
    let material = prepare(&input.material, spectrum, context)?;

    let builder = StressSequenceBuilder::new(spectrum, &input.options)?;
    let sequences = builder.build_all()?;
    let baseline = spectrum_damage(&sequences, &material, &input.options)?;
    let gag = GagEvent::find(&sequences, spectrum);
    debug!(damage = baseline.damage, contributions = input.contributions.len(), "baseline complete");

    let outcomes = runner.run_units(input.contributions.len(), |index| {
        let contribution = &input.contributions[index];
        match &contribution.kind {
            ContributionKind::Increment { loadcase_factors } => {
                let factors = isolating_factors(spectrum, &input.options.loadcase_factors, loadcase_factors);
                let sequences = builder.clone().with_loadcase_factors(&factors).build_all()?;
                spectrum_damage(&sequences, &material, &input.options)
            }
            ContributionKind::Gag => gag_damage(gag.as_ref(), spectrum, &material, &input.options),
        }
    });

    let contributions: Vec<DamageContributionResult> = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| {
            let name = &input.contributions[index].name;
            match outcome {
                Ok(summary) => DamageContributionResult::completed(index, name, summary, &baseline),
                Err(error) => {
                    warn!(contribution = %name, error = %error, "contribution failed");
                    DamageContributionResult::failed(index, name, error)
                }
            }
        })
        .collect();

    info!(
        label = %input.label,
        baseline = baseline.damage,
        failed = contributions.iter().filter(|c| !c.is_success()).count(),
        "damage contribution complete"
    );

    Ok(LoadcaseDamageContributionResult {
        stamp: AnalysisStamp::new(&input.label, &input.material, context),
        baseline,
        gag,
        contributions,
    })
}

/// Damage of the GAG cycle repeated once per flight flown
fn gag_damage(
    gag: Option<&GagEvent>,
    spectrum: &Spectrum,
    material: &Material,
    options: &SequenceOptions,
) -> FatigueResult<DamageSummary> {
    let mut accumulator = DamageAccumulator::new(material, options.omission_level, options.apply_omission);
    if let Some(gag) = gag {
        accumulator.add_sequence(&gag.cycle_sequence(), spectrum.total_validity());
    }
    finite_damage(accumulator.finish(), material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{fixtures, Sequential};

    fn input(contributions: Vec<DamageContribution>) -> LoadcaseDamageContributionInput {
        LoadcaseDamageContributionInput {
            label: "fixture".to_string(),
            material: fixtures::material(),
            options: SequenceOptions::default(),
            contributions,
        }
    }

    fn unit(code: i32) -> LoadcaseFactor {
        LoadcaseFactor::new(code, LoadcaseKind::Increment, StressModifier::multiply(1.0))
    }

    #[test]
    fn test_isolating_factors() {
        let spectrum = fixtures::spectrum();
        let base = vec![LoadcaseFactor::new(101, LoadcaseKind::Increment, StressModifier::multiply(2.0))];
        let factors = isolating_factors(&spectrum, &base, &[unit(102)]);
        let by_code = |c: i32| factors.iter().find(|f| f.loadcase == c).map(|f| f.modifier);
        assert_eq!(by_code(101), Some(StressModifier::multiply(0.0)));
        assert_eq!(by_code(102), Some(StressModifier::multiply(1.0)));
    }

    #[test]
    fn test_contributions_in_order() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let i = input(vec![
            DamageContribution::increment("Gust", vec![unit(101)]),
            DamageContribution::gag("GAG"),
            DamageContribution::increment("All", vec![unit(101), unit(102)]),
        ]);
        assert_eq!(i.gag_index(), Some(1));
        let result = calculate(&i, &fixtures::spectrum(), &ctx, &Sequential).unwrap();

        assert!(result.baseline.damage > 0.0);
        let names: Vec<&str> = result.contributions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Gust", "GAG", "All"]);
        assert!(result.failures().next().is_none());

        // listing every loadcase with identity modifiers reproduces the baseline
        let all = &result.contributions[2];
        assert!((all.damage.unwrap() - result.baseline.damage).abs() < 1e-15);
        assert!((all.damage_ratio.unwrap() - 1.0).abs() < 1e-9);

        let gag = result.gag.as_ref().unwrap();
        // 1g sx 60 + gust 30 / 1g sx 60 - gust 20
        assert!((gag.max.stress - 90.0).abs() < 1e-9);
        assert!((gag.min.stress - 40.0).abs() < 1e-9);
        assert_eq!(gag.min.peak_number, 2);
        assert!(result.contributions[1].damage.unwrap() > 0.0);
    }

    #[test]
    fn test_deterministic() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let i = input(vec![
            DamageContribution::increment("Maneuver", vec![unit(102)]),
            DamageContribution::gag("GAG"),
        ]);
        let spectrum = fixtures::spectrum();
        let a = calculate(&i, &spectrum, &ctx, &Sequential).unwrap();
        let b = calculate(&i, &spectrum, &ctx, &Sequential).unwrap();
        assert_eq!(a.contributions, b.contributions);
        assert_eq!(a.baseline, b.baseline);
    }

    #[test]
    fn test_two_gags_rejected() {
        let i = input(vec![DamageContribution::gag("A"), DamageContribution::gag("B")]);
        assert_eq!(i.validate(&fixtures::spectrum()).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_unknown_contribution_loadcase() {
        let i = input(vec![DamageContribution::increment("X", vec![unit(999)])]);
        assert_eq!(i.validate(&fixtures::spectrum()).unwrap_err().error_code(), "UNKNOWN_LOADCASE");
    }

    #[test]
    fn test_failed_unit_is_reported_in_place() {
        struct FailSecond;
        impl UnitRunner for FailSecond {
            fn run_units<T, F>(&self, count: usize, unit: F) -> Vec<FatigueResult<T>>
            where
                T: Send,
                F: Fn(usize) -> FatigueResult<T> + Sync + Send,
            {
                (0..count)
                    .map(|i| if i == 1 { Err(FatigueError::cancelled("unit 1")) } else { unit(i) })
                    .collect()
            }
        }

        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let i = input(vec![
            DamageContribution::increment("Gust", vec![unit(101)]),
            DamageContribution::increment("Maneuver", vec![unit(102)]),
        ]);
        let result = calculate(&i, &fixtures::spectrum(), &ctx, &FailSecond).unwrap();
        assert!(result.contributions[0].is_success());
        let failed = &result.contributions[1];
        assert_eq!(failed.contribution_index, 1);
        assert_eq!(failed.damage, None);
        assert!(failed.failure.as_ref().unwrap().is_recoverable());
    }
}
