//! # spectra_core - Flight Spectrum Fatigue Engine
//!
//! `spectra_core` synthesizes flight-by-flight stress sequences from
//! pre-loaded spectrum data (1g, incremental, delta-P and delta-T stresses)
//! and evaluates fatigue damage and crack propagation against material
//! curves. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: analyses take their inputs and collaborators explicitly
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, configuration errors before any computation
//! - **Partial Results**: a failing sub-unit is reported in place, siblings still complete
//!
//! ## Quick Start
//!
//! ```rust
//! use spectra_core::analysis::{equivalent_stress, AnalysisContext, EquivalentStressInput};
//! use spectra_core::materials::{AnalysisType, FatigueMaterial, InMemoryMaterialLibrary, Material, MaterialRef};
//! use spectra_core::spectrum::Spectrum;
//!
//! let spectrum: Spectrum = serde_json::from_str(r#"{
//!     "name": "demo",
//!     "oneg_cases": [ { "issy_code": 1, "event": "1G", "stress": 80.0 } ],
//!     "increment_cases": [ { "issy_code": 10, "event": "GUST", "stress": 5.0 } ],
//!     "flights": [ { "flight_id": 1, "validity": 100.0, "peaks": [
//!         { "peak_number": 1, "segment": { "name": "CRUISE", "number": 3 }, "oneg_issy": 1,
//!           "increments": [ { "issy_code": 10, "factor_number": 1, "factor_value": 4.0 } ],
//!           "demand": { "number": 1, "sign": "Positive" } },
//!         { "peak_number": 2, "segment": { "name": "CRUISE", "number": 3 }, "oneg_issy": 1,
//!           "increments": [ { "issy_code": 10, "factor_number": 1, "factor_value": -4.0 } ],
//!           "demand": { "number": 1, "sign": "Negative" } }
//!     ] } ]
//! }"#).unwrap();
//!
//! let library = InMemoryMaterialLibrary::new().with_material(Material::Fatigue(FatigueMaterial {
//!     name: "2024-T351".to_string(),
//!     specification: String::new(),
//!     slope: 4.0,
//!     mean_stress_exponent: 0.5,
//!     reference_stress: 100.0,
//!     reference_cycles: 1e6,
//! }));
//!
//! let input = EquivalentStressInput::new("Lower skin", MaterialRef::new("2024-T351", AnalysisType::Fatigue));
//! let result = equivalent_stress::calculate(&input, &spectrum, &AnalysisContext::new(&library, "analyst")).unwrap();
//! assert!(result.damage > 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`spectrum`] - Pre-loaded spectrum data (loadcases, flights, peaks)
//! - [`stress`] - Plane stress states and component projection
//! - [`modifiers`] - Segment and loadcase stress modifiers
//! - [`interpolation`] - Delta-P ratio and delta-T interpolation
//! - [`increments`] - Extreme incremental stresses per load factor
//! - [`sequence`] - Stress sequence synthesis (full, fast, GAG)
//! - [`damage`] - Rainflow counting and damage accumulation
//! - [`materials`] - Material curves and the material library seam
//! - [`analysis`] - Equivalent stress, damage contribution, damage angle
//! - [`batch`] - Batch container and batch runs
//! - [`dispatch`] - Bounded worker pools with cancellation
//! - [`settings`] - TOML engine settings
//! - [`units`] - Angle unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - JSON loading and atomic saves

pub mod analysis;
pub mod batch;
pub mod damage;
pub mod dispatch;
pub mod errors;
pub mod file_io;
pub mod increments;
pub mod interpolation;
pub mod materials;
pub mod modifiers;
pub mod sequence;
pub mod settings;
pub mod spectrum;
pub mod stress;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use analysis::{AnalysisContext, AnalysisItem, AnalysisOutcome, Sequential, UnitRunner};
pub use batch::{AnalysisBatch, BatchReport};
pub use errors::{FatigueError, FatigueResult};
pub use sequence::{SequenceOptions, StressSequenceBuilder};
pub use spectrum::Spectrum;
