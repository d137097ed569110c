//! # Incremental Stress Extremes
//!
//! An [`IncrementStress`] keeps, for each of the 8 load factor numbers, the
//! largest positive and the most negative incremental stress seen so far,
//! together with where it came from (flight, peak, loadcase).
//!
//! Slots are addressed by a [`FactorSlot`] (factor number + sign) instead of
//! index arithmetic. Updates go through two reducers:
//!
//! - positive slot: keep the larger positive value
//! - negative slot: keep the more negative value
//!
//! An empty slot accepts the first value offered. Zero increments carry no
//! direction and are ignored.
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::increments::{FactorSlot, IncrementInfo, IncrementSign, IncrementStress};
//!
//! let mut extremes = IncrementStress::new();
//! extremes.set_info(2, IncrementInfo::new(3.0, 1, 10, 1010, "GUST"));
//! extremes.set_info(2, IncrementInfo::new(5.0, 1, 11, 1010, "GUST"));
//! extremes.set_info(2, IncrementInfo::new(-4.0, 1, 12, 1020, "GUST DOWN"));
//!
//! assert_eq!(extremes.stress(FactorSlot::new(2, IncrementSign::Positive)), Some(5.0));
//! assert_eq!(extremes.stress(FactorSlot::new(2, IncrementSign::Negative)), Some(-4.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};

/// Number of load factor numbers
pub const FACTOR_COUNT: usize = 8;

/// Number of slots (factor numbers × sign)
pub const SLOT_COUNT: usize = FACTOR_COUNT * 2;

/// Direction of an incremental stress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncrementSign {
    Positive,
    Negative,
}

impl IncrementSign {
    pub const ALL: [IncrementSign; 2] = [IncrementSign::Positive, IncrementSign::Negative];

    /// Sign of a stress value; zero has none
    pub fn of(stress: f64) -> Option<IncrementSign> {
        if stress > 0.0 {
            Some(IncrementSign::Positive)
        } else if stress < 0.0 {
            Some(IncrementSign::Negative)
        } else {
            None
        }
    }

    /// Whether `candidate` is more extreme than `current` in this direction
    fn prefers(self, candidate: f64, current: f64) -> bool {
        match self {
            IncrementSign::Positive => candidate > current,
            IncrementSign::Negative => candidate < current,
        }
    }
}

/// Address of one slot: load factor number (1..=8) and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactorSlot {
    pub number: u8,
    pub sign: IncrementSign,
}

impl FactorSlot {
    pub fn new(number: u8, sign: IncrementSign) -> Self {
        FactorSlot { number, sign }
    }

    /// Slot index, or `None` for factor numbers outside 1..=8
    pub fn index(&self) -> Option<usize> {
        let n = usize::from(self.number);
        if n == 0 || n > FACTOR_COUNT {
            return None;
        }
        let offset = match self.sign {
            IncrementSign::Positive => 0,
            IncrementSign::Negative => 1,
        };
        Some((n - 1) * 2 + offset)
    }

    pub fn validate(&self) -> FatigueResult<()> {
        match self.index() {
            Some(_) => Ok(()),
            None => Err(FatigueError::invalid_input(
                "factor_number",
                self.number.to_string(),
                format!("Factor number must be between 1 and {}", FACTOR_COUNT),
            )),
        }
    }

    /// All 16 slots in factor order, positive before negative
    pub fn all() -> impl Iterator<Item = FactorSlot> {
        (1..=FACTOR_COUNT as u8)
            .flat_map(|n| IncrementSign::ALL.into_iter().map(move |s| FactorSlot::new(n, s)))
    }
}

/// Incremental stress with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementInfo {
    pub stress: f64,
    pub flight_id: u32,
    pub peak_number: u32,
    pub issy_code: i32,
    pub event: String,
}

impl IncrementInfo {
    pub fn new(stress: f64, flight_id: u32, peak_number: u32, issy_code: i32, event: impl Into<String>) -> Self {
        IncrementInfo {
            stress,
            flight_id,
            peak_number,
            issy_code,
            event: event.into(),
        }
    }
}

/// Extreme incremental stresses per factor number and direction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncrementStress {
    slots: [Option<IncrementInfo>; SLOT_COUNT],
}

impl IncrementStress {
    pub fn new() -> Self {
        IncrementStress::default()
    }

    /// Offer a value to the slot of `factor_number` matching its sign.
    ///
    /// Returns `true` when the slot now holds `info`.
    pub fn set_info(&mut self, factor_number: u8, info: IncrementInfo) -> bool {
        let Some(sign) = IncrementSign::of(info.stress) else {
            return false;
        };
        let Some(index) = FactorSlot::new(factor_number, sign).index() else {
            return false;
        };
        let slot = &mut self.slots[index];
        let replace = match slot {
            None => true,
            Some(current) => sign.prefers(info.stress, current.stress),
        };
        if replace {
            *slot = Some(info);
        }
        replace
    }

    /// Occupant of a slot
    pub fn get(&self, slot: FactorSlot) -> Option<&IncrementInfo> {
        slot.index().and_then(|i| self.slots[i].as_ref())
    }

    /// Stress held by a slot
    pub fn stress(&self, slot: FactorSlot) -> Option<f64> {
        self.get(slot).map(|info| info.stress)
    }

    /// Occupied slots in factor order
    pub fn occupied(&self) -> impl Iterator<Item = (FactorSlot, &IncrementInfo)> {
        FactorSlot::all().filter_map(move |slot| self.get(slot).map(|info| (slot, info)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Fold another set of extremes into this one
    pub fn merge(&mut self, other: &IncrementStress) {
        for (slot, info) in other.occupied() {
            self.set_info(slot.number, info.clone());
        }
    }
}
