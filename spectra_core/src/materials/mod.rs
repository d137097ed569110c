//! # Materials Library
//!
//! Material curves used by damage accumulation. The analysis type selects
//! which curve family is looked up:
//!
//! - **Fatigue**: S-N curve with Walker mean-stress correction
//! - **Preffas**: crack propagation with the sequence-wide opening level
//! - **LinearPropagation**: crack propagation without load interaction
//!
//! Materials are provided by the caller through the [`MaterialLibrary`]
//! trait; [`InMemoryMaterialLibrary`] is a JSON-loadable implementation.
//!
//! ## JSON Serialization
//!
//! ```json
//! [
//!   { "type": "Fatigue", "name": "2024-T351", "slope": 4.0,
//!     "mean_stress_exponent": 0.5, "reference_stress": 100.0, "reference_cycles": 1e6 },
//!   { "type": "Preffas", "name": "2024-T351", "ceff": 1e-10, "m": 3.0,
//!     "a": 0.5, "b": 0.4, "c": 0.1 }
//! ]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::materials::{AnalysisType, InMemoryMaterialLibrary, MaterialLibrary};
//!
//! let json = r#"[{ "type": "Fatigue", "name": "2024-T351", "slope": 4.0,
//!     "mean_stress_exponent": 0.5, "reference_stress": 100.0, "reference_cycles": 1e6 }]"#;
//! let library = InMemoryMaterialLibrary::from_json(json).unwrap();
//!
//! assert!(library.material("2024-T351", AnalysisType::Fatigue).is_some());
//! assert!(library.material("2024-T351", AnalysisType::Preffas).is_none());
//! ```

pub mod fatigue;
pub mod propagation;

pub use fatigue::FatigueMaterial;
pub use propagation::PropagationMaterial;

use serde::{Deserialize, Serialize};

use crate::errors::{FatigueError, FatigueResult};

/// Damage model of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnalysisType {
    #[default]
    Fatigue,
    Preffas,
    LinearPropagation,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 3] = [
        AnalysisType::Fatigue,
        AnalysisType::Preffas,
        AnalysisType::LinearPropagation,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisType::Fatigue => "Fatigue",
            AnalysisType::Preffas => "Preffas propagation",
            AnalysisType::LinearPropagation => "Linear propagation",
        }
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Material curve of one analysis type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Material {
    Fatigue(FatigueMaterial),
    Preffas(PropagationMaterial),
    LinearPropagation(PropagationMaterial),
}

impl Material {
    pub fn name(&self) -> &str {
        match self {
            Material::Fatigue(m) => &m.name,
            Material::Preffas(m) | Material::LinearPropagation(m) => &m.name,
        }
    }

    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            Material::Fatigue(_) => AnalysisType::Fatigue,
            Material::Preffas(_) => AnalysisType::Preffas,
            Material::LinearPropagation(_) => AnalysisType::LinearPropagation,
        }
    }

    pub fn validate(&self) -> FatigueResult<()> {
        match self {
            Material::Fatigue(m) => m.validate(),
            Material::Preffas(m) | Material::LinearPropagation(m) => m.validate(),
        }
    }
}

/// Name + analysis type, as stored in analysis inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialRef {
    pub name: String,
    pub analysis_type: AnalysisType,
}

impl MaterialRef {
    pub fn new(name: impl Into<String>, analysis_type: AnalysisType) -> Self {
        MaterialRef {
            name: name.into(),
            analysis_type,
        }
    }

    /// Look the material up and validate it
    pub fn resolve(&self, library: &dyn MaterialLibrary) -> FatigueResult<Material> {
        let material = library
            .material(&self.name, self.analysis_type)
            .ok_or_else(|| FatigueError::material_not_found(&self.name, self.analysis_type.display_name()))?;
        material.validate()?;
        Ok(material)
    }
}

/// Material lookup service provided by the caller
pub trait MaterialLibrary: Send + Sync {
    fn material(&self, name: &str, analysis_type: AnalysisType) -> Option<Material>;
}

/// Material library held in memory, serialized as a list of materials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryMaterialLibrary {
    materials: Vec<Material>,
}

impl InMemoryMaterialLibrary {
    pub fn new() -> Self {
        InMemoryMaterialLibrary::default()
    }

    /// Add a material (builder pattern); replaces one with the same name and type
    pub fn with_material(mut self, material: Material) -> Self {
        self.insert(material);
        self
    }

    pub fn insert(&mut self, material: Material) {
        let key = (material.name().to_string(), material.analysis_type());
        match self
            .materials
            .iter_mut()
            .find(|m| m.name() == key.0 && m.analysis_type() == key.1)
        {
            Some(existing) => *existing = material,
            None => self.materials.push(material),
        }
    }

    pub fn from_json(json: &str) -> FatigueResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialLibrary for InMemoryMaterialLibrary {
    fn material(&self, name: &str, analysis_type: AnalysisType) -> Option<Material> {
        self.materials
            .iter()
            .find(|m| m.name() == name && m.analysis_type() == analysis_type)
            .cloned()
    }
}
