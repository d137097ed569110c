//! # Stress Sequence Synthesis
//!
//! Turns the peaks of every flight into a sequence of total stresses:
//!
//! ```text
//! total = overall( steady + increment )
//! steady    = 1g (projected, loadcase + segment modified)
//!           + ΔP (pressure ratio × peak ΔP, segment modified)
//!           + ΔT (interpolated at peak ΔT, segment modified)
//! increment = demanded slot of the peak's IncrementStress, segment modified
//! ```
//!
//! Negative totals are clamped to zero when `remove_negative_stresses` is set.
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::sequence::{SequenceOptions, StressSequenceBuilder};
//! use spectra_core::spectrum::Spectrum;
//!
//! let spectrum = Spectrum::default();
//! let options = SequenceOptions::default();
//! let builder = StressSequenceBuilder::new(&spectrum, &options).unwrap();
//! assert!(builder.build_all().unwrap().is_empty());
//! ```

pub mod builder;
pub mod gag;
pub mod oneg;
pub mod options;
pub mod steady;

pub use builder::StressSequenceBuilder;
pub use gag::{GagEvent, GagExtreme, GagPeak};
pub use oneg::{OneGStresses, OnegStress};
pub use options::{DeltaPSettings, DeltaTSettings, DtReferenceSettings, SequenceOptions};
pub use steady::{SteadyStateComposer, SteadyStress};

use serde::{Deserialize, Serialize};

use crate::spectrum::Segment;

/// One synthesized peak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencePeak {
    pub peak_number: u32,
    pub segment: Segment,
    pub oneg_issy: i32,
    pub steady: SteadyStress,
    /// Modified incremental stress (0 when the peak demands none)
    pub increment: f64,
    /// Loadcase the increment came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment_issy: Option<i32>,
    /// Final stress after the overall modifier and negative removal
    pub total: f64,
}

/// Synthesized stress sequence of one flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressSequence {
    pub flight_id: u32,
    pub flight_name: String,
    pub validity: f64,
    pub peaks: Vec<SequencePeak>,
}

impl StressSequence {
    /// Total stresses in time order
    pub fn stresses(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.total).collect()
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}
