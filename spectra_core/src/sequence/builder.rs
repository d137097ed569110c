//! Full and fast sequence synthesis for one stress projection.

use crate::errors::{FatigueError, FatigueResult};
use crate::increments::{IncrementInfo, IncrementStress};
use crate::interpolation::{DeltaPRatio, DeltaTInterpolator};
use crate::modifiers::{LoadcaseFactor, LoadcaseKind, StressCategory, StressModifierResolver};
use crate::spectrum::{Flight, PeakRecord, Spectrum};
use crate::stress::StressProjection;

use super::oneg::OneGStresses;
use super::options::SequenceOptions;
use super::steady::{SteadyStateComposer, SteadyStress};
use super::{SequencePeak, StressSequence};

/// Builds stress sequences for one spectrum, option set and projection.
///
/// Everything the builder needs (modifier maps, projected 1g stresses,
/// interpolators) is resolved at construction; building is read-only.
#[derive(Debug, Clone)]
pub struct StressSequenceBuilder<'a> {
    spectrum: &'a Spectrum,
    options: &'a SequenceOptions,
    resolver: StressModifierResolver,
    oneg: OneGStresses,
    delta_p: DeltaPRatio,
    delta_t: DeltaTInterpolator,
}

impl<'a> StressSequenceBuilder<'a> {
    /// Builder for the projection configured in `options`
    pub fn new(spectrum: &'a Spectrum, options: &'a SequenceOptions) -> FatigueResult<Self> {
        Self::with_projection(spectrum, options, options.projection())
    }

    pub fn with_projection(
        spectrum: &'a Spectrum,
        options: &'a SequenceOptions,
        projection: StressProjection,
    ) -> FatigueResult<Self> {
        let oneg = OneGStresses::compute(spectrum, projection)?;
        Self::with_oneg(spectrum, options, oneg)
    }

    /// Builder reusing already projected 1g stresses
    pub fn with_oneg(spectrum: &'a Spectrum, options: &'a SequenceOptions, oneg: OneGStresses) -> FatigueResult<Self> {
        let projection = oneg.projection();
        let delta_p = options.delta_p_ratio(spectrum, projection)?;
        let delta_t = options.delta_t_interpolator(spectrum, projection)?;
        tracing::debug!(dp_ratio = delta_p.ratio, dt_mode = delta_t.mode_name(), "sequence builder ready");
        Ok(StressSequenceBuilder {
            spectrum,
            options,
            resolver: options.resolver(),
            delta_p,
            delta_t,
            oneg,
        })
    }

    /// Replace the loadcase factors of the options (contribution runs)
    pub fn with_loadcase_factors(mut self, loadcase_factors: &[LoadcaseFactor]) -> Self {
        self.resolver = StressModifierResolver::new(&self.options.segment_factors, loadcase_factors);
        self
    }

    pub fn projection(&self) -> StressProjection {
        self.oneg.projection()
    }

    pub fn spectrum(&self) -> &Spectrum {
        self.spectrum
    }

    /// Full sequences of every flight, in spectrum order
    pub fn build_all(&self) -> FatigueResult<Vec<StressSequence>> {
        self.spectrum.flights.iter().map(|f| self.build_flight(f)).collect()
    }

    /// Fast sequences of every flight, in spectrum order
    pub fn build_all_fast(&self) -> FatigueResult<Vec<StressSequence>> {
        self.spectrum.flights.iter().map(|f| self.build_fast_flight(f)).collect()
    }

    /// One synthesized peak per peak record
    pub fn build_flight(&self, flight: &Flight) -> FatigueResult<StressSequence> {
        let mut peaks = Vec::with_capacity(flight.peaks.len());
        for peak in &flight.peaks {
            let steady = self.steady(flight.flight_id, peak)?;
            let extremes = self.increments(flight.flight_id, peak)?;
            let demanded = peak.demand.and_then(|slot| extremes.get(slot));
            peaks.push(self.sequence_peak(peak, steady, demanded));
        }
        tracing::trace!(flight_id = flight.flight_id, peaks = peaks.len(), "built flight sequence");
        Ok(self.sequence(flight, peaks))
    }

    /// Per run of peaks sharing a segment: the steady stress of the first
    /// peak, then every occupied increment slot (factor order, positive
    /// before negative) on top of the steady stress of the peak it came from.
    pub fn build_fast_flight(&self, flight: &Flight) -> FatigueResult<StressSequence> {
        let mut peaks = Vec::new();
        for run in segment_runs(&flight.peaks) {
            let mut steadies = Vec::with_capacity(run.len());
            let mut extremes = IncrementStress::new();
            for peak in run {
                steadies.push(self.steady(flight.flight_id, peak)?);
                extremes.merge(&self.increments(flight.flight_id, peak)?);
            }

            peaks.push(self.sequence_peak(&run[0], steadies[0], None));
            for (_, info) in extremes.occupied() {
                let Some(index) = run.iter().position(|p| p.peak_number == info.peak_number) else {
                    return Err(FatigueError::Internal {
                        message: format!("increment source peak {} not in its segment run", info.peak_number),
                    });
                };
                peaks.push(self.sequence_peak(&run[index], steadies[index], Some(info)));
            }
        }
        tracing::trace!(flight_id = flight.flight_id, peaks = peaks.len(), "built fast sequence");
        Ok(self.sequence(flight, peaks))
    }

    fn sequence(&self, flight: &Flight, peaks: Vec<SequencePeak>) -> StressSequence {
        StressSequence {
            flight_id: flight.flight_id,
            flight_name: flight.name.clone(),
            validity: flight.validity,
            peaks,
        }
    }

    fn steady(&self, flight_id: u32, peak: &PeakRecord) -> FatigueResult<SteadyStress> {
        let oneg = self
            .oneg
            .stress(&peak.segment, peak.oneg_issy)
            .ok_or_else(|| FatigueError::unknown_loadcase("1g", peak.oneg_issy))?;
        let composer = SteadyStateComposer::new(&self.resolver, &self.delta_p, &self.delta_t);
        Ok(composer.compose(flight_id, peak, oneg))
    }

    /// Loadcase-modified increment terms reduced into their slots
    fn increments(&self, flight_id: u32, peak: &PeakRecord) -> FatigueResult<IncrementStress> {
        let projection = self.projection();
        let mut extremes = IncrementStress::new();
        for term in &peak.increments {
            let case = self
                .spectrum
                .increment_cases
                .get(term.issy_code)
                .ok_or_else(|| FatigueError::unknown_loadcase("increment", term.issy_code))?;
            let stress = self
                .resolver
                .loadcase_modifier(term.issy_code, LoadcaseKind::Increment)
                .apply(projection.project(&case.stress) * term.factor_value);
            extremes.set_info(
                term.factor_number,
                IncrementInfo::new(stress, flight_id, peak.peak_number, term.issy_code, case.event.as_str()),
            );
        }
        Ok(extremes)
    }

    fn sequence_peak(&self, peak: &PeakRecord, steady: SteadyStress, increment: Option<&IncrementInfo>) -> SequencePeak {
        let modified = increment.map(|info| {
            self.resolver
                .segment_modifier(StressCategory::Increment, &peak.segment)
                .apply(info.stress)
        });
        let raw = steady.total() + modified.unwrap_or(0.0);
        SequencePeak {
            peak_number: peak.peak_number,
            segment: peak.segment.clone(),
            oneg_issy: peak.oneg_issy,
            steady,
            increment: modified.unwrap_or(0.0),
            increment_issy: increment.map(|info| info.issy_code),
            total: self.finish(raw),
        }
    }

    fn finish(&self, total: f64) -> f64 {
        let total = self.options.overall_modifier.apply(total);
        if self.options.remove_negative_stresses && total < 0.0 {
            0.0
        } else {
            total
        }
    }
}

/// Contiguous runs of peaks sharing a segment
fn segment_runs(peaks: &[PeakRecord]) -> Vec<&[PeakRecord]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=peaks.len() {
        if i == peaks.len() || peaks[i].segment != peaks[start].segment {
            if i > start {
                runs.push(&peaks[start..i]);
            }
            start = i;
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::increments::{FactorSlot, IncrementSign};
    use crate::modifiers::{SegmentFactor, StressModifier};
    use crate::sequence::options::DeltaPSettings;
    use crate::spectrum::{IncrementTerm, LoadcaseStress, LoadcaseTable, Segment};
    use crate::stress::StressState;

    fn cruise() -> Segment {
        Segment::new("CRUISE", 3)
    }

    fn peak(number: u32, segment: Segment, increments: Vec<IncrementTerm>, demand: Option<FactorSlot>) -> PeakRecord {
        PeakRecord {
            peak_number: number,
            segment,
            oneg_issy: 11,
            increments,
            demand,
            delta_p: 50.0,
            delta_t: 0.0,
        }
    }

    fn term(issy: i32, factor_number: u8, value: f64) -> IncrementTerm {
        IncrementTerm {
            issy_code: issy,
            factor_number,
            factor_value: value,
        }
    }

    fn pos(n: u8) -> Option<FactorSlot> {
        Some(FactorSlot::new(n, IncrementSign::Positive))
    }

    fn neg(n: u8) -> Option<FactorSlot> {
        Some(FactorSlot::new(n, IncrementSign::Negative))
    }

    /// 1g 10, ΔP ratio 0.2 at ΔP 50, unit increments 1.0 (issy 101) and -1.0 (issy 102)
    fn spectrum(peaks: Vec<PeakRecord>) -> Spectrum {
        Spectrum {
            name: "test".to_string(),
            oneg_cases: LoadcaseTable::new().with_case(LoadcaseStress::new(11, "1G CRUISE", StressState::Scalar(10.0))),
            increment_cases: LoadcaseTable::new()
                .with_case(LoadcaseStress::new(101, "GUST UP", StressState::Scalar(1.0)))
                .with_case(LoadcaseStress::new(102, "GUST DOWN", StressState::Scalar(-1.0))),
            delta_p_cases: LoadcaseTable::new().with_case(LoadcaseStress::new(2000, "DP", StressState::Scalar(20.0))),
            flights: vec![Flight {
                flight_id: 1,
                name: "A".to_string(),
                validity: 1.0,
                peaks,
            }],
            ..Default::default()
        }
    }

    fn options() -> SequenceOptions {
        SequenceOptions {
            delta_p: Some(DeltaPSettings {
                issy_code: 2000,
                reference_pressure: 100.0,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_steady_plus_increment() {
        let s = spectrum(vec![peak(1, cruise(), vec![term(101, 1, 2.0)], pos(1))]);
        let o = options();
        let seq = StressSequenceBuilder::new(&s, &o).unwrap().build_all().unwrap();
        let p = &seq[0].peaks[0];
        assert!((p.steady.oneg_stress - 10.0).abs() < 1e-12);
        assert!((p.steady.dp_stress - 10.0).abs() < 1e-12);
        assert_eq!(p.steady.dt_stress, 0.0);
        assert!((p.increment - 2.0).abs() < 1e-12);
        assert!((p.total - 22.0).abs() < 1e-12);
        assert_eq!(p.increment_issy, Some(101));
    }

    #[test]
    fn test_missing_demand_is_zero() {
        let s = spectrum(vec![
            peak(1, cruise(), vec![term(101, 1, 2.0)], None),
            peak(2, cruise(), vec![term(101, 1, 2.0)], neg(1)),
        ]);
        let o = options();
        let seq = StressSequenceBuilder::new(&s, &o).unwrap().build_all().unwrap();
        assert_eq!(seq[0].stresses(), vec![20.0, 20.0]);
    }

    #[test]
    fn test_empty_flight() {
        let s = spectrum(vec![]);
        let o = options();
        let seq = StressSequenceBuilder::new(&s, &o).unwrap().build_all().unwrap();
        assert_eq!(seq.len(), 1);
        assert!(seq[0].is_empty());
    }

    #[test]
    fn test_negative_removal_and_overall_modifier() {
        let s = spectrum(vec![peak(1, cruise(), vec![term(102, 1, 30.0)], neg(1))]);
        let mut o = options();
        let raw = StressSequenceBuilder::new(&s, &o).unwrap().build_all().unwrap();
        assert!((raw[0].peaks[0].total + 10.0).abs() < 1e-12);

        o.remove_negative_stresses = true;
        let clamped = StressSequenceBuilder::new(&s, &o).unwrap().build_all().unwrap();
        assert_eq!(clamped[0].peaks[0].total, 0.0);

        o.remove_negative_stresses = false;
        o.overall_modifier = StressModifier::multiply(2.0);
        let doubled = StressSequenceBuilder::new(&s, &o).unwrap().build_all().unwrap();
        assert!((doubled[0].peaks[0].total + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_loadcase_mask_and_segment_increment_modifier() {
        let s = spectrum(vec![peak(1, cruise(), vec![term(101, 1, 2.0), term(101, 1, 4.0)], pos(1))]);
        let mut o = options();
        o.segment_factors = vec![SegmentFactor::new(cruise()).with(StressCategory::Increment, StressModifier::multiply(0.5))];
        let builder = StressSequenceBuilder::new(&s, &o).unwrap();
        let seq = builder.build_all().unwrap();
        assert!((seq[0].peaks[0].increment - 2.0).abs() < 1e-12);

        let masked = builder
            .with_loadcase_factors(&[LoadcaseFactor::new(101, LoadcaseKind::Increment, StressModifier::multiply(0.0))])
            .build_all()
            .unwrap();
        assert_eq!(masked[0].peaks[0].increment, 0.0);
        assert_eq!(masked[0].peaks[0].increment_issy, None);
    }

    #[test]
    fn test_fast_sequence_order() {
        let climb = Segment::new("CLIMB", 2);
        let s = spectrum(vec![
            peak(1, climb.clone(), vec![term(101, 2, 3.0)], pos(2)),
            peak(2, climb.clone(), vec![term(101, 1, 1.0), term(102, 2, 4.0)], neg(2)),
            peak(3, cruise(), vec![term(101, 1, 5.0)], pos(1)),
        ]);
        let o = options();
        let seq = StressSequenceBuilder::new(&s, &o).unwrap().build_all_fast().unwrap();
        let numbers: Vec<u32> = seq[0].peaks.iter().map(|p| p.peak_number).collect();
        // climb: steady of peak 1, +1 (factor 1, peak 2), +3 (factor 2, peak 1), -4 (factor 2, peak 2)
        // cruise: steady of peak 3, +5
        assert_eq!(numbers, vec![1, 2, 1, 2, 3, 3]);
        assert_eq!(seq[0].stresses(), vec![20.0, 21.0, 23.0, 16.0, 20.0, 25.0]);
    }

    #[test]
    fn test_segment_runs() {
        let a = Segment::new("A", 1);
        let b = Segment::new("B", 2);
        let peaks = vec![
            peak(1, a.clone(), vec![], None),
            peak(2, a.clone(), vec![], None),
            peak(3, b, vec![], None),
            peak(4, a, vec![], None),
        ];
        let runs: Vec<usize> = segment_runs(&peaks).iter().map(|r| r.len()).collect();
        assert_eq!(runs, vec![2, 1, 1]);
        assert!(segment_runs(&[]).is_empty());
    }
}
