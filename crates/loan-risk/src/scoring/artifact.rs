use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::forest::RandomForest;
use super::schema::FEATURE_SCHEMA;

/// Provenance stamped next to the model so a loader can refuse a layout it does not speak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub schema_version: u32,
    pub feature_columns: Vec<String>,
    pub training_samples: usize,
    pub seed: u64,
    pub trained_at: DateTime<Utc>,
}

impl ArtifactMetadata {
    pub fn current(training_samples: usize, seed: u64) -> Self {
        Self {
            schema_version: FEATURE_SCHEMA.version,
            feature_columns: FEATURE_SCHEMA.column_names(),
            training_samples,
            seed,
            trained_at: Utc::now(),
        }
    }
}

/// Persisted, read-only trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ArtifactMetadata,
    pub model: RandomForest,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {0}")]
    Missing(PathBuf),
    #[error("unable to read model artifact {path}: {source}")]
    Unreadable { path: PathBuf, source: io::Error },
    #[error("unable to decode model artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(
        "model artifact uses feature schema v{found} {columns:?}, expected v{expected}"
    )]
    SchemaMismatch {
        found: u32,
        expected: u32,
        columns: Vec<String>,
    },
    #[error("model artifact contains an unfitted classifier")]
    Unfitted,
    #[error("unable to encode model artifact: {0}")]
    Encode(serde_json::Error),
    #[error("unable to write model artifact {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

impl ModelArtifact {
    pub fn new(metadata: ArtifactMetadata, model: RandomForest) -> Self {
        Self { metadata, model }
    }

    /// Reject artifacts built against a different column layout or never fitted.
    pub fn verify(&self) -> Result<(), ArtifactError> {
        if !FEATURE_SCHEMA.matches(self.metadata.schema_version, &self.metadata.feature_columns)
        {
            return Err(ArtifactError::SchemaMismatch {
                found: self.metadata.schema_version,
                expected: FEATURE_SCHEMA.version,
                columns: self.metadata.feature_columns.clone(),
            });
        }
        if !self.model.is_fitted() {
            return Err(ArtifactError::Unfitted);
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ArtifactError::Missing(path.to_path_buf())
            } else {
                ArtifactError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let artifact: Self =
            serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        artifact.verify()?;
        Ok(artifact)
    }

    /// Serialize and overwrite whatever currently sits at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = serde_json::to_vec(self).map_err(ArtifactError::Encode)?;

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ArtifactError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, bytes).map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::classifier::Classifier;
    use crate::scoring::forest::ForestConfig;
    use crate::scoring::schema::{FeatureVector, Label};

    fn fitted_artifact() -> ModelArtifact {
        let rows = vec![
            FeatureVector([1_000.0, 500.0, 0.0, 12.0, 0.0, 0.0, 0.0]),
            FeatureVector([90_000.0, 800.0, 0.0, 12.0, 0.0, 2.0, 0.0]),
        ];
        let labels = vec![Label::Rejected, Label::Approved];
        let mut model = RandomForest::new(ForestConfig {
            n_trees: 3,
            bootstrap: false,
            ..ForestConfig::default()
        });
        model.fit(&rows, &labels).expect("fits");
        ModelArtifact::new(ArtifactMetadata::current(2, 42), model)
    }

    #[test]
    fn save_then_load_preserves_predictions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("model.json");
        let artifact = fitted_artifact();
        artifact.save(&path).expect("saves");

        let loaded = ModelArtifact::load(&path).expect("loads");
        assert_eq!(loaded, artifact);
    }

    #[test]
    fn missing_file_is_reported_as_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ModelArtifact::load(dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, ArtifactError::Missing(_)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.json");
        fs::write(&path, b"not a model").expect("writes");
        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ArtifactError::Decode { .. })
        ));
    }

    #[test]
    fn reordered_columns_are_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.json");
        let mut artifact = fitted_artifact();
        artifact.metadata.feature_columns.swap(5, 6);
        artifact.save(&path).expect("saves");

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ArtifactError::SchemaMismatch { found: 1, .. })
        ));
    }

    #[test]
    fn unfitted_model_is_refused() {
        let artifact = ModelArtifact::new(
            ArtifactMetadata::current(0, 0),
            RandomForest::new(ForestConfig::default()),
        );
        assert!(matches!(artifact.verify(), Err(ArtifactError::Unfitted)));
    }
}
