//! # Stress Modifiers
//!
//! User-selected MULTIPLY / ADD / SET modifiers, attached either to a flight
//! segment (one modifier per [`StressCategory`]) or to a loadcase (issy
//! code). The [`StressModifierResolver`] looks them up; anything without a
//! modifier gets the identity (MULTIPLY by 1.0).
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::modifiers::{
//!     LoadcaseFactor, LoadcaseKind, SegmentFactor, StressCategory, StressModifier,
//!     StressModifierResolver,
//! };
//! use spectra_core::spectrum::Segment;
//!
//! let cruise = Segment::new("CRUISE", 3);
//! let segment_factors = vec![
//!     SegmentFactor::new(cruise.clone()).with(StressCategory::DeltaP, StressModifier::multiply(1.33)),
//! ];
//! let loadcase_factors = vec![
//!     LoadcaseFactor::new(1010, LoadcaseKind::Increment, StressModifier::set(0.0)),
//! ];
//! let resolver = StressModifierResolver::new(&segment_factors, &loadcase_factors);
//!
//! assert!((resolver.resolve(StressCategory::DeltaP, &cruise, None, 100.0) - 133.0).abs() < 1e-9);
//! assert_eq!(
//!     resolver.resolve(StressCategory::Increment, &cruise, Some((1010, LoadcaseKind::Increment)), 42.0),
//!     0.0
//! );
//! ```

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};
use crate::spectrum::{Segment, Spectrum};

/// How a modifier value is applied to a stress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModificationMethod {
    /// new = old × value
    #[default]
    Multiply,
    /// new = old + value
    Add,
    /// new = value
    Set,
}

impl ModificationMethod {
    pub fn apply(&self, stress: f64, value: f64) -> f64 {
        match self {
            ModificationMethod::Multiply => stress * value,
            ModificationMethod::Add => stress + value,
            ModificationMethod::Set => value,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ModificationMethod::Multiply => "MULTIPLY",
            ModificationMethod::Add => "ADD",
            ModificationMethod::Set => "SET",
        }
    }
}

/// A (method, value) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressModifier {
    pub method: ModificationMethod,
    pub value: f64,
}

impl Default for StressModifier {
    fn default() -> Self {
        StressModifier::IDENTITY
    }
}

impl StressModifier {
    /// MULTIPLY by 1.0
    pub const IDENTITY: StressModifier = StressModifier {
        method: ModificationMethod::Multiply,
        value: 1.0,
    };

    pub fn new(method: ModificationMethod, value: f64) -> Self {
        StressModifier { method, value }
    }

    pub fn multiply(value: f64) -> Self {
        StressModifier::new(ModificationMethod::Multiply, value)
    }

    pub fn add(value: f64) -> Self {
        StressModifier::new(ModificationMethod::Add, value)
    }

    pub fn set(value: f64) -> Self {
        StressModifier::new(ModificationMethod::Set, value)
    }

    pub fn apply(&self, stress: f64) -> f64 {
        self.method.apply(stress, self.value)
    }

    pub fn is_identity(&self) -> bool {
        *self == StressModifier::IDENTITY
    }
}

impl std::fmt::Display for StressModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method.code(), self.value)
    }
}

/// Stress categories a segment modifier applies to, in fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressCategory {
    OneG,
    Increment,
    DeltaP,
    DeltaT,
}

impl StressCategory {
    pub const ALL: [StressCategory; 4] = [
        StressCategory::OneG,
        StressCategory::Increment,
        StressCategory::DeltaP,
        StressCategory::DeltaT,
    ];

    pub fn index(&self) -> usize {
        match self {
            StressCategory::OneG => 0,
            StressCategory::Increment => 1,
            StressCategory::DeltaP => 2,
            StressCategory::DeltaT => 3,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StressCategory::OneG => "ONEG",
            StressCategory::Increment => "INCREMENT",
            StressCategory::DeltaP => "DELTAP",
            StressCategory::DeltaT => "DELTAT",
        }
    }
}

/// Modifiers of one segment, one per stress category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentFactor {
    pub segment: Segment,
    /// Indexed by [`StressCategory::index`]
    #[serde(default)]
    pub modifiers: [StressModifier; 4],
}

impl SegmentFactor {
    /// Identity modifiers for every category
    pub fn new(segment: Segment) -> Self {
        SegmentFactor {
            segment,
            modifiers: [StressModifier::IDENTITY; 4],
        }
    }

    /// Set one category's modifier (builder pattern)
    pub fn with(mut self, category: StressCategory, modifier: StressModifier) -> Self {
        self.modifiers[category.index()] = modifier;
        self
    }

    pub fn modifier(&self, category: StressCategory) -> StressModifier {
        self.modifiers[category.index()]
    }
}

/// Whether a loadcase factor targets a 1g or an incremental loadcase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoadcaseKind {
    OneG,
    #[default]
    Increment,
}

/// Modifier of one loadcase.
///
/// Equality and hashing use the loadcase number only, so a later entry for
/// the same number replaces an earlier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadcaseFactor {
    pub loadcase: i32,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub kind: LoadcaseKind,
    pub modifier: StressModifier,
}

impl LoadcaseFactor {
    pub fn new(loadcase: i32, kind: LoadcaseKind, modifier: StressModifier) -> Self {
        LoadcaseFactor {
            loadcase,
            event: String::new(),
            comment: None,
            kind,
            modifier,
        }
    }

    /// Attach the event name (builder pattern)
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }
}

impl PartialEq for LoadcaseFactor {
    fn eq(&self, other: &Self) -> bool {
        self.loadcase == other.loadcase
    }
}

impl Eq for LoadcaseFactor {}

impl Hash for LoadcaseFactor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.loadcase.hash(state);
    }
}

/// Overlay `overrides` on `base`: same loadcase number → override wins.
///
/// Order is preserved: base entries first, then new loadcases from `overrides`.
pub fn merge_loadcase_factors(base: &[LoadcaseFactor], overrides: &[LoadcaseFactor]) -> Vec<LoadcaseFactor> {
    let mut merged: Vec<LoadcaseFactor> = Vec::with_capacity(base.len() + overrides.len());
    for factor in base.iter().chain(overrides) {
        match merged.iter_mut().find(|f| f.loadcase == factor.loadcase) {
            Some(existing) => *existing = factor.clone(),
            None => merged.push(factor.clone()),
        }
    }
    merged
}

/// Owned lookup of segment and loadcase modifiers.
///
/// Each analysis unit builds its own resolver; nothing is shared mutably.
#[derive(Debug, Clone, Default)]
pub struct StressModifierResolver {
    segments: HashMap<Segment, [StressModifier; 4]>,
    loadcases: HashMap<i32, (LoadcaseKind, StressModifier)>,
}

impl StressModifierResolver {
    /// Build from factor lists; later duplicates overwrite earlier ones.
    pub fn new(segment_factors: &[SegmentFactor], loadcase_factors: &[LoadcaseFactor]) -> Self {
        StressModifierResolver {
            segments: segment_factors
                .iter()
                .map(|f| (f.segment.clone(), f.modifiers))
                .collect(),
            loadcases: loadcase_factors
                .iter()
                .map(|f| (f.loadcase, (f.kind, f.modifier)))
                .collect(),
        }
    }

    /// Modifier of a segment for a category, identity if none
    pub fn segment_modifier(&self, category: StressCategory, segment: &Segment) -> StressModifier {
        self.segments
            .get(segment)
            .map(|m| m[category.index()])
            .unwrap_or(StressModifier::IDENTITY)
    }

    /// Modifier of a loadcase, identity if none or if the kind differs
    pub fn loadcase_modifier(&self, issy_code: i32, kind: LoadcaseKind) -> StressModifier {
        match self.loadcases.get(&issy_code) {
            Some((k, modifier)) if *k == kind => *modifier,
            _ => StressModifier::IDENTITY,
        }
    }

    /// Apply the loadcase modifier (when given), then the segment modifier.
    pub fn resolve(
        &self,
        category: StressCategory,
        segment: &Segment,
        loadcase: Option<(i32, LoadcaseKind)>,
        stress: f64,
    ) -> f64 {
        let after_loadcase = match loadcase {
            Some((issy, kind)) => self.loadcase_modifier(issy, kind).apply(stress),
            None => stress,
        };
        self.segment_modifier(category, segment).apply(after_loadcase)
    }

    /// Check that every factor refers to a segment / loadcase of the spectrum
    pub fn validate(&self, spectrum: &Spectrum) -> FatigueResult<()> {
        let segments = spectrum.segments();
        let mut configured: Vec<&Segment> = self.segments.keys().collect();
        configured.sort();
        if let Some(unknown) = configured.into_iter().find(|s| !segments.contains(*s)) {
            return Err(FatigueError::UnknownSegment {
                name: unknown.name.clone(),
                number: unknown.number,
            });
        }

        let mut codes: Vec<(&i32, &(LoadcaseKind, StressModifier))> = self.loadcases.iter().collect();
        codes.sort_by_key(|(code, _)| **code);
        for (code, (kind, _)) in codes {
            let (table, known) = match kind {
                LoadcaseKind::OneG => ("1g", spectrum.oneg_cases.contains(*code)),
                LoadcaseKind::Increment => ("increment", spectrum.increment_cases.contains(*code)),
            };
            if !known {
                return Err(FatigueError::unknown_loadcase(table, *code));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{Flight, LoadcaseStress, LoadcaseTable, PeakRecord};
    use crate::stress::StressState;

    #[test]
    fn test_method_semantics() {
        assert_eq!(StressModifier::multiply(2.0).apply(10.0), 20.0);
        assert_eq!(StressModifier::add(-3.0).apply(10.0), 7.0);
        assert_eq!(StressModifier::set(4.0).apply(10.0), 4.0);
        assert_eq!(StressModifier::IDENTITY.apply(10.0), 10.0);
    }

    #[test]
    fn test_method_tags() {
        let json = serde_json::to_string(&StressModifier::add(1.5)).unwrap();
        assert!(json.contains("\"ADD\""));
        let m: StressModifier = serde_json::from_str(r#"{"method":"SET","value":0.0}"#).unwrap();
        assert_eq!(m, StressModifier::set(0.0));
    }

    #[test]
    fn test_missing_factors_resolve_to_identity() {
        let resolver = StressModifierResolver::new(&[], &[]);
        let seg = Segment::new("TAXI", 1);
        for category in StressCategory::ALL {
            assert_eq!(resolver.resolve(category, &seg, Some((5, LoadcaseKind::OneG)), 12.5), 12.5);
        }
    }

    #[test]
    fn test_loadcase_then_segment() {
        let seg = Segment::new("CLIMB", 2);
        let resolver = StressModifierResolver::new(
            &[SegmentFactor::new(seg.clone()).with(StressCategory::OneG, StressModifier::add(5.0))],
            &[LoadcaseFactor::new(1, LoadcaseKind::OneG, StressModifier::multiply(2.0))],
        );
        // (10 × 2) + 5
        assert_eq!(resolver.resolve(StressCategory::OneG, &seg, Some((1, LoadcaseKind::OneG)), 10.0), 25.0);
    }

    #[test]
    fn test_loadcase_kind_must_match() {
        let resolver = StressModifierResolver::new(
            &[],
            &[LoadcaseFactor::new(1, LoadcaseKind::OneG, StressModifier::multiply(2.0))],
        );
        assert_eq!(resolver.loadcase_modifier(1, LoadcaseKind::Increment), StressModifier::IDENTITY);
    }

    #[test]
    fn test_duplicate_loadcase_overwrites() {
        let factors = vec![
            LoadcaseFactor::new(7, LoadcaseKind::Increment, StressModifier::multiply(2.0)),
            LoadcaseFactor::new(7, LoadcaseKind::Increment, StressModifier::multiply(3.0)),
        ];
        assert_eq!(factors[0], factors[1]);
        let resolver = StressModifierResolver::new(&[], &factors);
        assert_eq!(resolver.loadcase_modifier(7, LoadcaseKind::Increment), StressModifier::multiply(3.0));
    }

    #[test]
    fn test_merge_loadcase_factors() {
        let base = vec![
            LoadcaseFactor::new(1, LoadcaseKind::Increment, StressModifier::multiply(2.0)),
            LoadcaseFactor::new(2, LoadcaseKind::Increment, StressModifier::multiply(2.0)),
        ];
        let overrides = vec![
            LoadcaseFactor::new(2, LoadcaseKind::Increment, StressModifier::set(0.0)),
            LoadcaseFactor::new(3, LoadcaseKind::Increment, StressModifier::add(1.0)),
        ];
        let merged = merge_loadcase_factors(&base, &overrides);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].modifier, StressModifier::set(0.0));
        assert_eq!(merged[2].loadcase, 3);
    }

    #[test]
    fn test_validate_against_spectrum() {
        let seg = Segment::new("CRUISE", 3);
        let spectrum = Spectrum {
            name: "s".to_string(),
            oneg_cases: LoadcaseTable::new().with_case(LoadcaseStress::new(1, "1G", StressState::Scalar(1.0))),
            flights: vec![Flight {
                flight_id: 1,
                name: String::new(),
                validity: 1.0,
                peaks: vec![PeakRecord {
                    peak_number: 1,
                    segment: seg.clone(),
                    oneg_issy: 1,
                    increments: vec![],
                    demand: None,
                    delta_p: 0.0,
                    delta_t: 0.0,
                }],
            }],
            ..Default::default()
        };

        let ok = StressModifierResolver::new(
            &[SegmentFactor::new(seg)],
            &[LoadcaseFactor::new(1, LoadcaseKind::OneG, StressModifier::IDENTITY)],
        );
        assert!(ok.validate(&spectrum).is_ok());

        let bad_segment = StressModifierResolver::new(&[SegmentFactor::new(Segment::new("HOLD", 9))], &[]);
        assert_eq!(bad_segment.validate(&spectrum).unwrap_err().error_code(), "UNKNOWN_SEGMENT");

        let bad_loadcase = StressModifierResolver::new(
            &[],
            &[LoadcaseFactor::new(1, LoadcaseKind::Increment, StressModifier::IDENTITY)],
        );
        assert_eq!(bad_loadcase.validate(&spectrum).unwrap_err().error_code(), "UNKNOWN_LOADCASE");
    }
}
