//! # File I/O Module
//!
//! JSON documents (spectra, material libraries, batches, reports) are read
//! whole and written with atomic saves: write to `.tmp`, sync, rename, so an
//! interrupted save never leaves a truncated file behind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use spectra_core::batch::AnalysisBatch;
//! use spectra_core::file_io::{load_batch, save_json_atomic};
//! use std::path::Path;
//!
//! let batch = AnalysisBatch::new("Analyst", "Frame 42");
//! save_json_atomic(&batch, Path::new("frame42.batch.json"))?;
//! let loaded = load_batch(Path::new("frame42.batch.json"))?;
//! # Ok::<(), spectra_core::errors::FatigueError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::batch::{validate_version, AnalysisBatch};
use crate::errors::{FatigueError, FatigueResult};
use crate::materials::InMemoryMaterialLibrary;
use crate::spectrum::Spectrum;

/// Temporary path used while saving `path`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Save a value as pretty JSON with atomic write semantics.
///
/// 1. Serialize to JSON
/// 2. Write to `<path>.tmp`
/// 3. Sync to disk (fsync)
/// 4. Rename over `path`
pub fn save_json_atomic<T: Serialize>(value: &T, path: &Path) -> FatigueResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| FatigueError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| FatigueError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| FatigueError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;
    drop(tmp_file);

    let written = fs::metadata(&tmp_path)
        .map_err(|e| FatigueError::file_error("verify temp file", tmp_path.display().to_string(), e.to_string()))?
        .len();
    if written != json.len() as u64 {
        let _ = fs::remove_file(&tmp_path);
        return Err(FatigueError::file_error(
            "verify temp file",
            tmp_path.display().to_string(),
            format!("wrote {} of {} bytes", written, json.len()),
        ));
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        FatigueError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}

/// Read a whole file as text
pub fn read_text(path: &Path) -> FatigueResult<String> {
    let mut file =
        File::open(path).map_err(|e| FatigueError::file_error("open", path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| FatigueError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Load a JSON document
pub fn load_json<T: DeserializeOwned>(path: &Path) -> FatigueResult<T> {
    let contents = read_text(path)?;
    serde_json::from_str(&contents).map_err(|e| FatigueError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Load a batch and check its schema version.
///
/// # Returns
///
/// * `Err(FatigueError::VersionMismatch)` - File version is incompatible
/// * `Err(FatigueError::SerializationError)` - Invalid JSON
/// * `Err(FatigueError::FileError)` - I/O error
pub fn load_batch(path: &Path) -> FatigueResult<AnalysisBatch> {
    let batch: AnalysisBatch = load_json(path)?;
    validate_version(&batch.meta.version)?;
    Ok(batch)
}

pub fn load_spectrum(path: &Path) -> FatigueResult<Spectrum> {
    let spectrum: Spectrum = load_json(path)?;
    tracing::info!(
        path = %path.display(),
        flights = spectrum.flights.len(),
        peaks = spectrum.peak_count(),
        "spectrum loaded"
    );
    Ok(spectrum)
}

pub fn load_material_library(path: &Path) -> FatigueResult<InMemoryMaterialLibrary> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("spectra_test_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(
            tmp_path_for(Path::new("/data/batch.json")),
            Path::new("/data/batch.json.tmp")
        );
    }

    #[test]
    fn test_save_and_load_batch() {
        let path = temp_path("batch_roundtrip");
        let batch = AnalysisBatch::new("Test Analyst", "Frame 1");
        save_json_atomic(&batch, &path).unwrap();

        let loaded = load_batch(&path).unwrap();
        assert_eq!(loaded.meta.analyst, "Test Analyst");
        assert_eq!(loaded.meta.component, "Frame 1");
        assert!(!tmp_path_for(&path).exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_newer_batch_rejected() {
        let path = temp_path("batch_version");
        let mut batch = AnalysisBatch::new("A", "C");
        batch.meta.version = "0.9.0".to_string();
        save_json_atomic(&batch, &path).unwrap();

        let err = load_batch(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let missing = load_json::<Spectrum>(Path::new("/nonexistent/spectra/none.json")).unwrap_err();
        assert_eq!(missing.error_code(), "FILE_ERROR");

        let path = temp_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let invalid = load_spectrum(&path).unwrap_err();
        assert_eq!(invalid.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }
}
