//! # Error Types
//!
//! Structured error types for spectra_core. Errors are serializable so a
//! failed analysis unit can be stored next to the successful ones in a
//! partial result set.
//!
//! ## Error classes
//!
//! - **Configuration errors** (`InvalidInput`, `MaterialNotFound`,
//!   `UnknownSegment`, `UnknownLoadcase`, `InvalidAngleRange`) are raised
//!   before any computation starts.
//! - **Numeric degenerate cases** (zero reference pressure, zero cycles after
//!   omission) are never errors; they resolve to documented fallback values.
//! - **Unit failures** inside a fan-out (`CalculationFailed`, `Cancelled`) are
//!   reported per unit and never abort sibling units. `CalculationFailed`
//!   marks a damage sum the material curve drove to infinity or NaN.
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::errors::{FatigueError, FatigueResult};
//!
//! fn validate_omission(level: f64) -> FatigueResult<()> {
//!     if level < 0.0 {
//!         return Err(FatigueError::invalid_input(
//!             "omission_level",
//!             level.to_string(),
//!             "Omission level must be a non-negative stress range",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_omission(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for spectra_core operations
pub type FatigueResult<T> = Result<T, FatigueError>;

/// Structured error type for spectrum and damage operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FatigueError {
    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Material not found in the material library
    #[error("Material not found: {material_name} ({analysis_type})")]
    MaterialNotFound {
        material_name: String,
        analysis_type: String,
    },

    /// A segment factor refers to a segment absent from the spectrum
    #[error("Unknown segment: {name} (#{number})")]
    UnknownSegment { name: String, number: u32 },

    /// A loadcase code is referenced but not defined by the spectrum
    #[error("Unknown {table} loadcase: {issy_code}")]
    UnknownLoadcase { table: String, issy_code: i32 },

    /// Damage angle range cannot be scanned
    #[error("Invalid angle range: start {start_deg} deg, end {end_deg} deg, increment {increment_deg} deg - {reason}")]
    InvalidAngleRange {
        start_deg: f64,
        end_deg: f64,
        increment_deg: f64,
        reason: String,
    },

    /// A damage sum is not finite
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// The unit was abandoned by the scheduler before it started
    #[error("Cancelled before start: {unit}")]
    Cancelled { unit: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON or TOML serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FatigueError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FatigueError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        FatigueError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>, analysis_type: impl Into<String>) -> Self {
        FatigueError::MaterialNotFound {
            material_name: material_name.into(),
            analysis_type: analysis_type.into(),
        }
    }

    /// Create an UnknownLoadcase error
    pub fn unknown_loadcase(table: impl Into<String>, issy_code: i32) -> Self {
        FatigueError::UnknownLoadcase {
            table: table.into(),
            issy_code,
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        FatigueError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a Cancelled error
    pub fn cancelled(unit: impl Into<String>) -> Self {
        FatigueError::Cancelled { unit: unit.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        FatigueError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failed unit can simply be submitted again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FatigueError::Cancelled { .. })
    }

    /// Whether the error was raised by input validation, before any computation
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FatigueError::InvalidInput { .. }
                | FatigueError::MissingField { .. }
                | FatigueError::MaterialNotFound { .. }
                | FatigueError::UnknownSegment { .. }
                | FatigueError::UnknownLoadcase { .. }
                | FatigueError::InvalidAngleRange { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FatigueError::InvalidInput { .. } => "INVALID_INPUT",
            FatigueError::MissingField { .. } => "MISSING_FIELD",
            FatigueError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            FatigueError::UnknownSegment { .. } => "UNKNOWN_SEGMENT",
            FatigueError::UnknownLoadcase { .. } => "UNKNOWN_LOADCASE",
            FatigueError::InvalidAngleRange { .. } => "INVALID_ANGLE_RANGE",
            FatigueError::CalculationFailed { .. } => "CALCULATION_FAILED",
            FatigueError::Cancelled { .. } => "CANCELLED",
            FatigueError::FileError { .. } => "FILE_ERROR",
            FatigueError::SerializationError { .. } => "SERIALIZATION_ERROR",
            FatigueError::VersionMismatch { .. } => "VERSION_MISMATCH",
            FatigueError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for FatigueError {
    fn from(e: serde_json::Error) -> Self {
        FatigueError::SerializationError {
            reason: e.to_string(),
        }
    }
}

impl From<toml::de::Error> for FatigueError {
    fn from(e: toml::de::Error) -> Self {
        FatigueError::SerializationError {
            reason: e.to_string(),
        }
    }
}
