//! Steady (1g + ΔP + ΔT) stress of a peak.

use serde::{Deserialize, Serialize};

use crate::interpolation::{DeltaPRatio, DeltaTInterpolator};
use crate::modifiers::{LoadcaseKind, StressCategory, StressModifierResolver};
use crate::spectrum::PeakRecord;

/// Modified steady components of one peak
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SteadyStress {
    pub flight_id: u32,
    pub peak_number: u32,
    pub oneg_stress: f64,
    pub dp_stress: f64,
    pub dt_stress: f64,
}

impl SteadyStress {
    pub fn total(&self) -> f64 {
        self.oneg_stress + self.dp_stress + self.dt_stress
    }
}

/// Combines the projected 1g stress with pressure and temperature stresses,
/// each passed through its modifiers.
pub struct SteadyStateComposer<'a> {
    resolver: &'a StressModifierResolver,
    delta_p: &'a DeltaPRatio,
    delta_t: &'a DeltaTInterpolator,
}

impl<'a> SteadyStateComposer<'a> {
    pub fn new(resolver: &'a StressModifierResolver, delta_p: &'a DeltaPRatio, delta_t: &'a DeltaTInterpolator) -> Self {
        SteadyStateComposer {
            resolver,
            delta_p,
            delta_t,
        }
    }

    /// `oneg_stress` is the projected, unmodified 1g stress of the peak.
    pub fn compose(&self, flight_id: u32, peak: &PeakRecord, oneg_stress: f64) -> SteadyStress {
        let segment = &peak.segment;
        SteadyStress {
            flight_id,
            peak_number: peak.peak_number,
            oneg_stress: self.resolver.resolve(
                StressCategory::OneG,
                segment,
                Some((peak.oneg_issy, LoadcaseKind::OneG)),
                oneg_stress,
            ),
            dp_stress: self
                .resolver
                .resolve(StressCategory::DeltaP, segment, None, self.delta_p.stress(peak.delta_p)),
            dt_stress: self
                .resolver
                .resolve(StressCategory::DeltaT, segment, None, self.delta_t.stress(peak.delta_t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::{LoadcaseFactor, SegmentFactor, StressModifier};
    use crate::spectrum::Segment;

    fn peak() -> PeakRecord {
        PeakRecord {
            peak_number: 7,
            segment: Segment::new("CRUISE", 3),
            oneg_issy: 11,
            increments: vec![],
            demand: None,
            delta_p: 50.0,
            delta_t: 0.0,
        }
    }

    #[test]
    fn test_unmodified_sum() {
        let resolver = StressModifierResolver::default();
        let dp = DeltaPRatio::new(100.0, 20.0);
        let dt = DeltaTInterpolator::None;
        let steady = SteadyStateComposer::new(&resolver, &dp, &dt).compose(4, &peak(), 10.0);
        assert_eq!(steady.flight_id, 4);
        assert_eq!(steady.peak_number, 7);
        assert!((steady.total() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_modifiers_per_category() {
        let segment_factor = SegmentFactor::new(Segment::new("CRUISE", 3))
            .with(StressCategory::OneG, StressModifier::add(5.0))
            .with(StressCategory::DeltaP, StressModifier::multiply(2.0))
            .with(StressCategory::DeltaT, StressModifier::set(1.0));
        let loadcase = LoadcaseFactor::new(11, LoadcaseKind::OneG, StressModifier::multiply(3.0));
        let resolver = StressModifierResolver::new(&[segment_factor], &[loadcase]);
        let dp = DeltaPRatio::new(100.0, 20.0);
        let dt = DeltaTInterpolator::None;
        let steady = SteadyStateComposer::new(&resolver, &dp, &dt).compose(1, &peak(), 10.0);
        // loadcase first, then segment
        assert!((steady.oneg_stress - 35.0).abs() < 1e-12);
        assert!((steady.dp_stress - 20.0).abs() < 1e-12);
        assert_eq!(steady.dt_stress, 1.0);
    }
}
