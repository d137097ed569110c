//! # Cycle Counting and Damage Accumulation
//!
//! - [`rainflow`] - reversal extraction and 4-point rainflow counting
//! - [`accumulator`] - omission, damage summation and equivalent stress
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::damage::accumulate;
//! use spectra_core::materials::{FatigueMaterial, Material};
//!
//! let material = Material::Fatigue(FatigueMaterial {
//!     name: "2024-T351".to_string(),
//!     specification: String::new(),
//!     slope: 4.0,
//!     mean_stress_exponent: 0.5,
//!     reference_stress: 100.0,
//!     reference_cycles: 1.0e6,
//! });
//!
//! let summary = accumulate(&[-100.0, 100.0, -100.0], &material, 0.0, false);
//! assert!((summary.damage - 1.0e-6).abs() < 1e-15);
//! ```

pub mod accumulator;
pub mod rainflow;

pub use accumulator::{accumulate, DamageAccumulator, DamageSummary};
pub use rainflow::{count_cycles, reversals, Cycle};
