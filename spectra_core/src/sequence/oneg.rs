//! 1g stresses projected once per (segment, 1g loadcase).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};
use crate::spectrum::{Segment, Spectrum};
use crate::stress::StressProjection;

/// Projected 1g stress of one loadcase in one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnegStress {
    pub segment: Segment,
    pub issy_code: i32,
    pub event: String,
    pub stress: f64,
}

/// Cache of projected 1g stresses for one stress projection
#[derive(Debug, Clone)]
pub struct OneGStresses {
    projection: StressProjection,
    by_segment: HashMap<Segment, HashMap<i32, OnegStress>>,
}

impl OneGStresses {
    /// Project every (segment, 1g loadcase) pair used by the spectrum.
    pub fn compute(spectrum: &Spectrum, projection: StressProjection) -> FatigueResult<Self> {
        let mut by_segment: HashMap<Segment, HashMap<i32, OnegStress>> = HashMap::new();
        for peak in spectrum.flights.iter().flat_map(|f| f.peaks.iter()) {
            let cases = by_segment.entry(peak.segment.clone()).or_default();
            if cases.contains_key(&peak.oneg_issy) {
                continue;
            }
            let case = spectrum
                .oneg_cases
                .get(peak.oneg_issy)
                .ok_or_else(|| FatigueError::unknown_loadcase("1g", peak.oneg_issy))?;
            cases.insert(
                peak.oneg_issy,
                OnegStress {
                    segment: peak.segment.clone(),
                    issy_code: peak.oneg_issy,
                    event: case.event.clone(),
                    stress: projection.project(&case.stress),
                },
            );
        }
        tracing::debug!(
            segments = by_segment.len(),
            angle_rad = projection.angle.0,
            "projected 1g stresses"
        );
        Ok(OneGStresses { projection, by_segment })
    }

    pub fn projection(&self) -> StressProjection {
        self.projection
    }

    pub fn get(&self, segment: &Segment, issy_code: i32) -> Option<&OnegStress> {
        self.by_segment.get(segment).and_then(|cases| cases.get(&issy_code))
    }

    pub fn stress(&self, segment: &Segment, issy_code: i32) -> Option<f64> {
        self.get(segment, issy_code).map(|s| s.stress)
    }

    pub fn len(&self) -> usize {
        self.by_segment.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
