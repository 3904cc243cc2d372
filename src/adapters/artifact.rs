//! Ensemble artifact loader.
//!
//! An artifact is a directory holding `manifest.json` and one JSON file per
//! model. The manifest pins the feature contract the models were trained
//! against and the SHA-256 of every model file, so a stale or tampered
//! artifact is refused at startup instead of producing silently wrong curves.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::adapters::forest::{ExportedForest, SurvivalForest};
use crate::application::ModelEnsemble;
use crate::domain::FEATURE_CONTRACT;
use crate::ports::SurvivalModel;

/// Manifest file name inside an artifact directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Highest manifest format this build understands.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Errors raised while loading an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported manifest format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("feature contract mismatch: artifact declares {found}, this build expects {expected}")]
    ContractMismatch { expected: String, found: String },

    #[error("file hash mismatch for {0}")]
    HashMismatch(String),

    #[error("manifest lists no models")]
    EmptyEnsemble,

    #[error("model file {0:?} must be a plain relative path")]
    InvalidPath(String),

    #[error("invalid model {model}: {reason}")]
    InvalidModel { model: String, reason: String },
}

/// `manifest.json` contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub artifact_version: String,
    pub feature_contract: String,
    /// Training column names, in feature-row order
    pub feature_names: Vec<String>,
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub file: String,
    /// Lowercase hex SHA-256 of the file contents
    pub sha256: String,
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and check `manifest.json` without loading any model.
///
/// # Errors
/// Returns an error if the manifest is unreadable, uses an unsupported
/// format, or declares a different feature contract.
pub fn read_manifest(dir: &Path) -> Result<ArtifactManifest, ArtifactError> {
    let path = dir.join(MANIFEST_FILE);
    let bytes = read_file(&path)?;
    let manifest: ArtifactManifest =
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Json {
            path: path.clone(),
            source,
        })?;

    if manifest.format_version != SUPPORTED_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedFormat {
            found: manifest.format_version,
            expected: SUPPORTED_FORMAT_VERSION,
        });
    }

    if !FEATURE_CONTRACT.matches(&manifest.feature_contract, &manifest.feature_names) {
        return Err(ArtifactError::ContractMismatch {
            expected: format!(
                "{} [{}]",
                FEATURE_CONTRACT.version,
                FEATURE_CONTRACT.training_columns().collect::<Vec<_>>().join(", ")
            ),
            found: format!(
                "{} [{}]",
                manifest.feature_contract,
                manifest.feature_names.join(", ")
            ),
        });
    }

    if manifest.models.is_empty() {
        return Err(ArtifactError::EmptyEnsemble);
    }

    Ok(manifest)
}

/// Load every model listed in the manifest, in manifest order.
///
/// `path` may be the artifact directory or its `manifest.json`.
///
/// # Errors
/// Returns an error on the first check that fails; no partial ensemble is
/// ever returned.
pub fn load_ensemble(path: &Path) -> Result<ModelEnsemble, ArtifactError> {
    let base_dir = if path.is_file() {
        path.parent().unwrap_or_else(|| Path::new("."))
    } else {
        path
    };

    let manifest = read_manifest(base_dir)?;
    let mut models: Vec<Box<dyn SurvivalModel>> = Vec::with_capacity(manifest.models.len());

    for entry in &manifest.models {
        let is_plain = Path::new(&entry.file)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain || entry.file.is_empty() {
            return Err(ArtifactError::InvalidPath(entry.file.clone()));
        }

        let file_path = base_dir.join(&entry.file);
        let bytes = read_file(&file_path)?;
        if sha256_hex(&bytes) != entry.sha256.trim().to_ascii_lowercase() {
            tracing::error!("Model file hash mismatch: {}", entry.file);
            return Err(ArtifactError::HashMismatch(entry.file.clone()));
        }

        let exported: ExportedForest =
            serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Json {
                path: file_path.clone(),
                source,
            })?;
        let forest = SurvivalForest::from_exported(exported)?;
        tracing::debug!(
            "Loaded model {} ({} trees) from {}",
            forest.id(),
            forest.tree_count(),
            entry.file
        );
        models.push(Box::new(forest));
    }

    tracing::info!(
        "Loaded artifact {} with {} model(s) from {:?}",
        manifest.artifact_version,
        models.len(),
        base_dir
    );

    Ok(ModelEnsemble::new(manifest.artifact_version, models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureVector;
    use serde_json::json;
    use tempfile::tempdir;

    fn forest_json(id: &str, end: f64) -> String {
        json!({
            "id": id,
            "event_times": [0.0, 36.0],
            "trees": [{"nodes": [{"leaf": {"survival": [1.0, end]}}]}]
        })
        .to_string()
    }

    fn write_artifact(dir: &Path, models: &[(&str, String)]) -> ArtifactManifest {
        let mut entries = Vec::new();
        for (file, body) in models {
            fs::write(dir.join(file), body).unwrap();
            entries.push(ModelEntry {
                file: (*file).to_string(),
                sha256: sha256_hex(body.as_bytes()),
            });
        }
        let manifest = ArtifactManifest {
            format_version: SUPPORTED_FORMAT_VERSION,
            artifact_version: "test-artifact".into(),
            feature_contract: FEATURE_CONTRACT.version.into(),
            feature_names: FEATURE_CONTRACT.training_columns().map(String::from).collect(),
            models: entries,
        };
        save(dir, &manifest);
        manifest
    }

    fn save(dir: &Path, manifest: &ArtifactManifest) {
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec_pretty(manifest).unwrap(),
        )
        .unwrap();
    }

    fn two_models() -> Vec<(&'static str, String)> {
        vec![
            ("fold1.json", forest_json("fold-1", 0.8)),
            ("fold2.json", forest_json("fold-2", 0.6)),
        ]
    }

    #[test]
    fn test_loads_well_formed_artifact() {
        let dir = tempdir().unwrap();
        write_artifact(dir.path(), &two_models());

        let ensemble = load_ensemble(dir.path()).expect("Should load");
        assert_eq!(ensemble.version(), "test-artifact");
        assert_eq!(ensemble.model_ids().collect::<Vec<_>>(), ["fold-1", "fold-2"]);

        let curve = ensemble
            .consensus(&FeatureVector::from_encoded([0.0; 16]))
            .expect("Should predict");
        assert!((curve.three_year_rfs() - 0.7).abs() < 1e-12);

        // The manifest path itself is accepted too.
        let via_manifest = load_ensemble(&dir.path().join(MANIFEST_FILE)).expect("Should load");
        assert_eq!(via_manifest.len(), 2);
    }

    #[test]
    fn test_rejects_hash_mismatch() {
        let dir = tempdir().unwrap();
        write_artifact(dir.path(), &two_models());
        fs::write(dir.path().join("fold2.json"), forest_json("fold-2", 0.9)).unwrap();

        let err = load_ensemble(dir.path()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::HashMismatch(ref f) if f == "fold2.json"));
    }

    #[test]
    fn test_rejects_contract_drift() {
        let dir = tempdir().unwrap();
        let mut manifest = write_artifact(dir.path(), &two_models());
        manifest.feature_names.swap(0, 1);
        save(dir.path(), &manifest);
        assert!(matches!(
            load_ensemble(dir.path()),
            Err(ArtifactError::ContractMismatch { .. })
        ));

        manifest.feature_names.swap(0, 1);
        manifest.feature_contract = "gastric-rfs-features/v0".into();
        save(dir.path(), &manifest);
        assert!(matches!(
            load_ensemble(dir.path()),
            Err(ArtifactError::ContractMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_ensemble(dir.path()),
            Err(ArtifactError::Io { .. })
        ));

        write_artifact(dir.path(), &two_models());
        fs::remove_file(dir.path().join("fold1.json")).unwrap();
        assert!(matches!(
            load_ensemble(dir.path()),
            Err(ArtifactError::Io { ref path, .. }) if path.ends_with("fold1.json")
        ));
    }

    #[test]
    fn test_rejects_bad_manifests() {
        let dir = tempdir().unwrap();
        let mut manifest = write_artifact(dir.path(), &two_models());

        manifest.format_version = 2;
        save(dir.path(), &manifest);
        assert!(matches!(
            load_ensemble(dir.path()),
            Err(ArtifactError::UnsupportedFormat { found: 2, .. })
        ));

        manifest.format_version = SUPPORTED_FORMAT_VERSION;
        let models = std::mem::take(&mut manifest.models);
        save(dir.path(), &manifest);
        assert!(matches!(
            load_ensemble(dir.path()),
            Err(ArtifactError::EmptyEnsemble)
        ));

        manifest.models = models;
        manifest.models[0].file = "../fold1.json".into();
        save(dir.path(), &manifest);
        assert!(matches!(
            load_ensemble(dir.path()),
            Err(ArtifactError::InvalidPath(_))
        ));

        fs::write(dir.path().join(MANIFEST_FILE), b"{not json").unwrap();
        assert!(matches!(
            load_ensemble(dir.path()),
            Err(ArtifactError::Json { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_model_file() {
        let dir = tempdir().unwrap();
        let broken = json!({
            "id": "broken",
            "event_times": [0.0, 36.0],
            "trees": [{"nodes": [{"leaf": {"survival": [1.0]}}]}]
        })
        .to_string();
        write_artifact(dir.path(), &[("broken.json", broken)]);

        let err = load_ensemble(dir.path()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::InvalidModel { ref model, .. } if model == "broken"));
    }

    #[test]
    fn test_hash_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let mut manifest = write_artifact(dir.path(), &two_models());
        for entry in &mut manifest.models {
            entry.sha256 = entry.sha256.to_ascii_uppercase();
        }
        save(dir.path(), &manifest);
        assert!(load_ensemble(dir.path()).is_ok());
    }
}
