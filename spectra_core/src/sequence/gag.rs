//! Ground-air-ground cycle: the overall maximum and minimum of the spectrum.

use serde::{Deserialize, Serialize};

use super::{SequencePeak, StressSequence};
use crate::spectrum::{Segment, Spectrum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GagExtreme {
    Max,
    Min,
}

/// One extreme peak of the spectrum with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GagPeak {
    pub flight_id: u32,
    pub peak_number: u32,
    pub segment: Segment,
    /// 1g event name and loadcase of the peak
    pub event: String,
    pub issy_code: i32,
    /// Increment loadcase, when the peak carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment_issy: Option<i32>,
    pub stress: f64,
    pub extreme: GagExtreme,
}

impl GagPeak {
    fn from_peak(flight_id: u32, peak: &SequencePeak, spectrum: &Spectrum, extreme: GagExtreme) -> Self {
        GagPeak {
            flight_id,
            peak_number: peak.peak_number,
            segment: peak.segment.clone(),
            event: spectrum
                .oneg_cases
                .get(peak.oneg_issy)
                .map(|c| c.event.clone())
                .unwrap_or_default(),
            issy_code: peak.oneg_issy,
            increment_issy: peak.increment_issy,
            stress: peak.total,
            extreme,
        }
    }
}

/// The single worst ground-air-ground cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GagEvent {
    pub max: GagPeak,
    pub min: GagPeak,
}

impl GagEvent {
    /// Overall max and min over all flights; first occurrence wins on ties.
    ///
    /// Returns `None` when the sequences hold no peak.
    pub fn find(sequences: &[StressSequence], spectrum: &Spectrum) -> Option<GagEvent> {
        let mut max: Option<(u32, &SequencePeak)> = None;
        let mut min: Option<(u32, &SequencePeak)> = None;
        for sequence in sequences {
            for peak in &sequence.peaks {
                if max.map_or(true, |(_, m)| peak.total > m.total) {
                    max = Some((sequence.flight_id, peak));
                }
                if min.map_or(true, |(_, m)| peak.total < m.total) {
                    min = Some((sequence.flight_id, peak));
                }
            }
        }
        let (max_flight, max_peak) = max?;
        let (min_flight, min_peak) = min?;
        Some(GagEvent {
            max: GagPeak::from_peak(max_flight, max_peak, spectrum, GagExtreme::Max),
            min: GagPeak::from_peak(min_flight, min_peak, spectrum, GagExtreme::Min),
        })
    }

    pub fn range(&self) -> f64 {
        self.max.stress - self.min.stress
    }

    /// Stress sequence holding exactly the GAG cycle
    pub fn cycle_sequence(&self) -> [f64; 3] {
        [self.min.stress, self.max.stress, self.min.stress]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SteadyStress;
    use crate::spectrum::{LoadcaseStress, LoadcaseTable};
    use crate::stress::StressState;

    fn peak(number: u32, total: f64) -> SequencePeak {
        SequencePeak {
            peak_number: number,
            segment: Segment::new("CRUISE", 3),
            oneg_issy: 11,
            steady: SteadyStress::default(),
            increment: 0.0,
            increment_issy: None,
            total,
        }
    }

    fn sequence(flight_id: u32, totals: &[f64]) -> StressSequence {
        StressSequence {
            flight_id,
            flight_name: String::new(),
            validity: 1.0,
            peaks: totals.iter().enumerate().map(|(i, t)| peak(i as u32 + 1, *t)).collect(),
        }
    }

    fn spectrum() -> Spectrum {
        Spectrum {
            oneg_cases: LoadcaseTable::new().with_case(LoadcaseStress::new(11, "1G CRUISE", StressState::Scalar(0.0))),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_across_flights() {
        let seqs = vec![sequence(1, &[0.0, 120.0, -10.0]), sequence(2, &[5.0, 150.0, -30.0, 150.0])];
        let gag = GagEvent::find(&seqs, &spectrum()).unwrap();
        assert_eq!(gag.max.flight_id, 2);
        assert_eq!(gag.max.peak_number, 2);
        assert_eq!(gag.min.stress, -30.0);
        assert_eq!(gag.max.event, "1G CRUISE");
        assert_eq!(gag.max.extreme, GagExtreme::Max);
        assert!((gag.range() - 180.0).abs() < 1e-12);
        assert_eq!(gag.cycle_sequence(), [-30.0, 150.0, -30.0]);
    }

    #[test]
    fn test_empty() {
        assert!(GagEvent::find(&[], &spectrum()).is_none());
        assert!(GagEvent::find(&[sequence(1, &[])], &spectrum()).is_none());
    }
}
