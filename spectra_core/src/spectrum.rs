//! # Spectrum Data
//!
//! The pre-loaded flight data the engine works on. Parsing the ANA/TXT/STF
//! files that produce it is the caller's job; the engine receives this
//! structure already in memory (usually deserialized from JSON).
//!
//! ## Structure
//!
//! ```text
//! Spectrum
//! ├── oneg_cases:      issy code -> 1g stress
//! ├── increment_cases: issy code -> unit incremental stress
//! ├── delta_p_cases:   issy code -> stress at the reference pressure
//! ├── delta_t_cases:   issy code -> stress at a reference temperature
//! └── flights: [Flight]
//!     └── peaks: [PeakRecord] (segment, 1g code, increment terms, ΔP, ΔT)
//! ```

use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};
use crate::increments::{FactorSlot, FACTOR_COUNT};
use crate::stress::StressState;

/// Named, numbered phase of a flight (taxi, climb, cruise, ...).
///
/// Identity is `(name, number)`; the peak range is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub number: u32,
    #[serde(default)]
    pub start_peak: u32,
    #[serde(default)]
    pub end_peak: u32,
}

impl Segment {
    pub fn new(name: impl Into<String>, number: u32) -> Self {
        Segment {
            name: name.into(),
            number,
            start_peak: 0,
            end_peak: 0,
        }
    }

    /// Set the peak range (builder pattern)
    pub fn with_peaks(mut self, start_peak: u32, end_peak: u32) -> Self {
        self.start_peak = start_peak;
        self.end_peak = end_peak;
        self
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number && self.name == other.name
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.number.hash(state);
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.number)
    }
}

/// Stress of one loadcase (issy code) in a stress table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadcaseStress {
    pub issy_code: i32,
    #[serde(default)]
    pub event: String,
    pub stress: StressState,
}

impl LoadcaseStress {
    pub fn new(issy_code: i32, event: impl Into<String>, stress: StressState) -> Self {
        LoadcaseStress {
            issy_code,
            event: event.into(),
            stress,
        }
    }
}

/// Loadcase stresses keyed by issy code. Serialized as a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<LoadcaseStress>", into = "Vec<LoadcaseStress>")]
pub struct LoadcaseTable {
    cases: HashMap<i32, LoadcaseStress>,
}

impl From<Vec<LoadcaseStress>> for LoadcaseTable {
    fn from(cases: Vec<LoadcaseStress>) -> Self {
        LoadcaseTable {
            cases: cases.into_iter().map(|c| (c.issy_code, c)).collect(),
        }
    }
}

impl From<LoadcaseTable> for Vec<LoadcaseStress> {
    fn from(table: LoadcaseTable) -> Self {
        let mut cases: Vec<LoadcaseStress> = table.cases.into_values().collect();
        cases.sort_by_key(|c| c.issy_code);
        cases
    }
}

impl LoadcaseTable {
    pub fn new() -> Self {
        LoadcaseTable::default()
    }

    /// Add a loadcase (builder pattern); a duplicate code replaces the earlier one
    pub fn with_case(mut self, case: LoadcaseStress) -> Self {
        self.cases.insert(case.issy_code, case);
        self
    }

    pub fn get(&self, issy_code: i32) -> Option<&LoadcaseStress> {
        self.cases.get(&issy_code)
    }

    pub fn contains(&self, issy_code: i32) -> bool {
        self.cases.contains_key(&issy_code)
    }

    /// Issy codes in ascending order
    pub fn codes(&self) -> Vec<i32> {
        let mut codes: Vec<i32> = self.cases.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// One incremental loadcase acting on a peak: `unit stress(issy) × factor_value`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncrementTerm {
    pub issy_code: i32,
    /// Load factor number (1..=8) the term belongs to
    pub factor_number: u8,
    pub factor_value: f64,
}

/// One peak of a flight as delivered by the ANA/TXT parsers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakRecord {
    pub peak_number: u32,
    pub segment: Segment,
    /// 1g loadcase of the peak
    pub oneg_issy: i32,
    #[serde(default)]
    pub increments: Vec<IncrementTerm>,
    /// Factor slot whose extreme increment this peak represents
    #[serde(default)]
    pub demand: Option<FactorSlot>,
    #[serde(default)]
    pub delta_p: f64,
    #[serde(default)]
    pub delta_t: f64,
}

/// One flight type and its peaks, in time order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub flight_id: u32,
    #[serde(default)]
    pub name: String,
    /// Number of occurrences of this flight in the spectrum
    #[serde(default = "default_validity")]
    pub validity: f64,
    pub peaks: Vec<PeakRecord>,
}

fn default_validity() -> f64 {
    1.0
}

/// Complete pre-loaded spectrum
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spectrum {
    pub name: String,
    #[serde(default)]
    pub oneg_cases: LoadcaseTable,
    #[serde(default)]
    pub increment_cases: LoadcaseTable,
    #[serde(default)]
    pub delta_p_cases: LoadcaseTable,
    #[serde(default)]
    pub delta_t_cases: LoadcaseTable,
    #[serde(default)]
    pub flights: Vec<Flight>,
}

impl Spectrum {
    /// All segments referenced by the flights, ordered by segment number
    pub fn segments(&self) -> BTreeSet<Segment> {
        self.flights
            .iter()
            .flat_map(|f| f.peaks.iter().map(|p| p.segment.clone()))
            .collect()
    }

    /// Sum of flight validities (number of flights flown)
    pub fn total_validity(&self) -> f64 {
        self.flights.iter().map(|f| f.validity).sum()
    }

    pub fn peak_count(&self) -> usize {
        self.flights.iter().map(|f| f.peaks.len()).sum()
    }

    /// Check internal references before any computation.
    pub fn validate(&self) -> FatigueResult<()> {
        for flight in &self.flights {
            if !flight.validity.is_finite() || flight.validity < 0.0 {
                return Err(FatigueError::invalid_input(
                    format!("flights[{}].validity", flight.flight_id),
                    flight.validity.to_string(),
                    "Validity must be a finite, non-negative flight count",
                ));
            }
            for peak in &flight.peaks {
                if !self.oneg_cases.contains(peak.oneg_issy) {
                    return Err(FatigueError::unknown_loadcase("1g", peak.oneg_issy));
                }
                for term in &peak.increments {
                    if !self.increment_cases.contains(term.issy_code) {
                        return Err(FatigueError::unknown_loadcase("increment", term.issy_code));
                    }
                    if term.factor_number == 0 || usize::from(term.factor_number) > FACTOR_COUNT {
                        return Err(FatigueError::invalid_input(
                            format!("flights[{}].peaks[{}].factor_number", flight.flight_id, peak.peak_number),
                            term.factor_number.to_string(),
                            format!("Factor number must be between 1 and {}", FACTOR_COUNT),
                        ));
                    }
                }
                if let Some(slot) = peak.demand {
                    slot.validate()?;
                }
                if !peak.delta_p.is_finite() || !peak.delta_t.is_finite() {
                    return Err(FatigueError::invalid_input(
                        format!("flights[{}].peaks[{}]", flight.flight_id, peak.peak_number),
                        format!("dp={}, dt={}", peak.delta_p, peak.delta_t),
                        "Delta-P and delta-T must be finite",
                    ));
                }
            }
        }
        Ok(())
    }
}
