//! # Engine Settings
//!
//! Process-wide settings read from TOML. Every field has a default, so an
//! empty file is valid.
//!
//! ```toml
//! max_parallel_analyses = 2
//! max_parallel_subanalyses = 8
//! log_filter = "spectra_core=info"
//! requested_by = "j.analyst"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};
use crate::file_io::read_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Analyses of a batch running at the same time
    pub max_parallel_analyses: usize,
    /// Sub-units (contributions, angles) running at the same time
    pub max_parallel_subanalyses: usize,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    /// User the results are attributed to
    pub requested_by: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_parallel_analyses: 1,
            max_parallel_subanalyses: 4,
            log_filter: "info".to_string(),
            requested_by: String::new(),
        }
    }
}

impl EngineSettings {
    pub fn from_toml_str(contents: &str) -> FatigueResult<Self> {
        let settings: EngineSettings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> FatigueResult<Self> {
        Self::from_toml_str(&read_text(path)?)
    }

    pub fn validate(&self) -> FatigueResult<()> {
        if self.max_parallel_analyses == 0 {
            return Err(FatigueError::invalid_input(
                "max_parallel_analyses",
                "0",
                "At least one analysis must be allowed to run",
            ));
        }
        if self.max_parallel_subanalyses == 0 {
            return Err(FatigueError::invalid_input(
                "max_parallel_subanalyses",
                "0",
                "At least one sub-analysis must be allowed to run",
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> FatigueResult<String> {
        toml::to_string_pretty(self).map_err(|e| FatigueError::SerializationError { reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = EngineSettings::from_toml_str("").unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_partial_file() {
        let settings = EngineSettings::from_toml_str("max_parallel_subanalyses = 12\nrequested_by = \"ops\"").unwrap();
        assert_eq!(settings.max_parallel_subanalyses, 12);
        assert_eq!(settings.max_parallel_analyses, 1);
        assert_eq!(settings.requested_by, "ops");
    }

    #[test]
    fn test_zero_limits_rejected() {
        let err = EngineSettings::from_toml_str("max_parallel_analyses = 0").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_malformed_toml() {
        let err = EngineSettings::from_toml_str("max_parallel_analyses = \"many\"").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_toml_roundtrip() {
        let settings = EngineSettings {
            max_parallel_analyses: 3,
            ..Default::default()
        };
        let text = settings.to_toml_string().unwrap();
        assert_eq!(EngineSettings::from_toml_str(&text).unwrap(), settings);
    }
}
