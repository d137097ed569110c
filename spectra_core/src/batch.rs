//! # Analysis Batches
//!
//! An `AnalysisBatch` is the root container for a set of analyses run
//! against one spectrum. Batches serialize to human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! AnalysisBatch
//! ├── meta: BatchMetadata (version, analyst, component, timestamps)
//! └── items: HashMap<Uuid, AnalysisItem> (all analyses)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::analysis::{AnalysisItem, EquivalentStressInput};
//! use spectra_core::batch::AnalysisBatch;
//! use spectra_core::materials::{AnalysisType, MaterialRef};
//!
//! let mut batch = AnalysisBatch::new("Jane Analyst", "Wing root joint");
//! let id = batch.add_item(AnalysisItem::EquivalentStress(EquivalentStressInput::new(
//!     "Lower skin",
//!     MaterialRef::new("2024-T351", AnalysisType::Fatigue),
//! )));
//! assert!(batch.items.contains_key(&id));
//!
//! let json = serde_json::to_string_pretty(&batch).unwrap();
//! assert!(json.contains("EquivalentStress"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{AnalysisContext, AnalysisItem, AnalysisOutcome, UnitRunner};
use crate::errors::{FatigueError, FatigueResult};
use crate::spectrum::Spectrum;

/// Current schema version for batch files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root batch container.
///
/// Items are stored in a flat UUID-keyed map; [`AnalysisBatch::ordered_items`]
/// gives the deterministic run order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBatch {
    pub meta: BatchMetadata,
    pub items: HashMap<Uuid, AnalysisItem>,
}

impl AnalysisBatch {
    /// Create a new empty batch.
    ///
    /// # Arguments
    ///
    /// * `analyst` - Name of the responsible analyst
    /// * `component` - Structural component the batch covers
    pub fn new(analyst: impl Into<String>, component: impl Into<String>) -> Self {
        let now = Utc::now();
        AnalysisBatch {
            meta: BatchMetadata {
                version: SCHEMA_VERSION.to_string(),
                analyst: analyst.into(),
                component: component.into(),
                created: now,
                modified: now,
            },
            items: HashMap::new(),
        }
    }

    /// Add an analysis; returns the UUID assigned to it.
    pub fn add_item(&mut self, item: AnalysisItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    /// Remove an analysis by UUID.
    pub fn remove_item(&mut self, id: &Uuid) -> Option<AnalysisItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&AnalysisItem> {
        self.items.get(id)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items sorted by label, then id
    pub fn ordered_items(&self) -> Vec<(Uuid, &AnalysisItem)> {
        let mut items: Vec<(Uuid, &AnalysisItem)> = self.items.iter().map(|(id, item)| (*id, item)).collect();
        items.sort_by(|a, b| a.1.label().cmp(b.1.label()).then(a.0.cmp(&b.0)));
        items
    }

    /// Run every analysis. Analyses go through `analyses`, their own
    /// sub-units through `subunits`; a failing analysis is reported in its
    /// entry.
    pub fn run<A: UnitRunner, S: UnitRunner>(
        &self,
        spectrum: &Spectrum,
        context: &AnalysisContext<'_>,
        analyses: &A,
        subunits: &S,
    ) -> BatchReport {
        let items = self.ordered_items();
        info!(analyses = items.len(), spectrum = %spectrum.name, "running batch");
        let outcomes = analyses.run_units(items.len(), |index| items[index].1.run(spectrum, context, subunits));

        let entries: Vec<BatchEntry> = items
            .iter()
            .zip(outcomes)
            .map(|((id, item), outcome)| {
                let (outcome, failure) = match outcome {
                    Ok(outcome) => (Some(outcome), None),
                    Err(error) => {
                        warn!(label = item.label(), error = %error, "analysis failed");
                        (None, Some(error))
                    }
                };
                BatchEntry {
                    item_id: *id,
                    label: item.label().to_string(),
                    kind: item.analysis_kind().to_string(),
                    outcome,
                    failure,
                }
            })
            .collect();

        BatchReport {
            batch_version: self.meta.version.clone(),
            spectrum: spectrum.name.clone(),
            entries,
            completed_at: Utc::now(),
        }
    }
}

impl Default for AnalysisBatch {
    fn default() -> Self {
        AnalysisBatch::new("", "")
    }
}

/// Batch metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub analyst: String,
    pub component: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Outcome of one batch item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub item_id: Uuid,
    pub label: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AnalysisOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FatigueError>,
}

/// Results of a batch run, in run order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_version: String,
    pub spectrum: String,
    pub entries: Vec<BatchEntry>,
    pub completed_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.failure.is_some()).count()
    }

    pub fn entry(&self, item_id: &Uuid) -> Option<&BatchEntry> {
        self.entries.iter().find(|e| e.item_id == *item_id)
    }
}

/// Validate that a file version is compatible with the current schema.
pub fn validate_version(file_version: &str) -> FatigueResult<()> {
    let mismatch = || FatigueError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }
    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }
    // 0.x: a newer minor may carry breaking changes
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{fixtures, DamageAngleInput, AngleRange, EquivalentStressInput, Sequential};
    use crate::materials::{AnalysisType, MaterialRef};
    use crate::sequence::SequenceOptions;

    fn equivalent(label: &str) -> AnalysisItem {
        AnalysisItem::EquivalentStress(EquivalentStressInput::new(label, fixtures::material()))
    }

    #[test]
    fn test_batch_creation() {
        let batch = AnalysisBatch::new("Jane Analyst", "Frame 42");
        assert_eq!(batch.meta.analyst, "Jane Analyst");
        assert_eq!(batch.meta.component, "Frame 42");
        assert_eq!(batch.meta.version, SCHEMA_VERSION);
        assert_eq!(batch.item_count(), 0);
    }

    #[test]
    fn test_add_remove_item() {
        let mut batch = AnalysisBatch::new("A", "C");
        let id = batch.add_item(equivalent("E-1"));
        assert_eq!(batch.item_count(), 1);
        assert_eq!(batch.get_item(&id).map(|i| i.label()), Some("E-1"));
        assert!(batch.remove_item(&id).is_some());
        assert!(batch.remove_item(&id).is_none());
    }

    #[test]
    fn test_batch_serialization() {
        let mut batch = AnalysisBatch::new("A", "C");
        batch.add_item(AnalysisItem::DamageAngle(DamageAngleInput {
            label: "Angles".to_string(),
            material: MaterialRef::new("2024-T351", AnalysisType::Fatigue),
            options: SequenceOptions::default(),
            range: AngleRange::from_degrees(0.0, 90.0, 15.0),
        }));
        let json = serde_json::to_string_pretty(&batch).unwrap();
        assert!(json.contains("\"type\": \"DamageAngle\""));
        assert!(json.contains("\"increment_deg\""));
        let roundtrip: AnalysisBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.item_count(), 1);
    }

    #[test]
    fn test_run_reports_every_item() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let mut batch = AnalysisBatch::new("A", "C");
        let good = batch.add_item(equivalent("B good"));
        let bad = batch.add_item(AnalysisItem::EquivalentStress(EquivalentStressInput::new(
            "A missing material",
            MaterialRef::new("7075-T6", AnalysisType::Fatigue),
        )));

        let report = batch.run(&fixtures::spectrum(), &ctx, &Sequential, &Sequential);
        assert_eq!(report.entries.len(), 2);
        // label order
        assert_eq!(report.entries[0].item_id, bad);
        assert_eq!(report.failed_count(), 1);
        assert!(report.entry(&good).unwrap().outcome.is_some());
        assert_eq!(
            report.entry(&bad).unwrap().failure.as_ref().map(|e| e.error_code()),
            Some("MATERIAL_NOT_FOUND")
        );
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
