//! Loading the trained classifier from disk
//!
//! An artifact is a file pair: the model file, which carries the forest and
//! the authoritative class label order, and an optional metadata file with
//! descriptive fields. The model file may be JSON or MessagePack, picked by
//! extension. Everything is validated once here so inference can assume a
//! well-formed model.

use crate::error::{ModelError, Result};
use crate::features::FEATURE_COUNT;
use crate::forest::RandomForest;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "model/iris_model.json";
pub const DEFAULT_METADATA_PATH: &str = "model/metadata.json";

/// Descriptive fields reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub feature_names: Vec<String>,
    /// Must equal the model's class order.
    pub target_names: Vec<String>,
    /// Held-out accuracy measured at training time
    #[serde(default)]
    pub accuracy: Option<f64>,
    pub n_features: usize,
}

impl ModelMetadata {
    /// Metadata for a model shipped without a metadata file.
    fn derived_from(forest: &RandomForest) -> Self {
        Self {
            feature_names: (0..forest.n_features)
                .map(|i| format!("feature_{i}"))
                .collect(),
            target_names: forest.classes.clone(),
            accuracy: None,
            n_features: forest.n_features,
        }
    }

    fn check_against(&self, forest: &RandomForest) -> Result<()> {
        if self.target_names != forest.classes {
            return Err(ModelError::LabelMismatch {
                model: forest.classes.clone(),
                metadata: self.target_names.clone(),
            });
        }
        if self.n_features != forest.n_features {
            return Err(ModelError::FeatureCountMismatch {
                context: "metadata n_features",
                expected: forest.n_features,
                found: self.n_features,
            });
        }
        if self.feature_names.len() != forest.n_features {
            return Err(ModelError::FeatureCountMismatch {
                context: "metadata feature_names",
                expected: forest.n_features,
                found: self.feature_names.len(),
            });
        }
        if let Some(accuracy) = self.accuracy {
            if !(0.0..=1.0).contains(&accuracy) {
                return Err(ModelError::InvalidArtifact(format!(
                    "accuracy {accuracy} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// The trained classifier plus its metadata. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    forest: RandomForest,
    metadata: ModelMetadata,
}

impl ModelArtifact {
    /// Validates and assembles an artifact. Without metadata, a minimal set
    /// is derived from the forest.
    pub fn from_parts(forest: RandomForest, metadata: Option<ModelMetadata>) -> Result<Self> {
        forest.validate()?;

        if forest.n_features != FEATURE_COUNT {
            return Err(ModelError::FeatureCountMismatch {
                context: "model n_features",
                expected: FEATURE_COUNT,
                found: forest.n_features,
            });
        }

        let metadata = match metadata {
            Some(metadata) => {
                metadata.check_against(&forest)?;
                metadata
            }
            None => ModelMetadata::derived_from(&forest),
        };

        Ok(Self { forest, metadata })
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn classes(&self) -> &[String] {
        &self.forest.classes
    }
}

/// Where the artifact pair lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn new(model: impl Into<PathBuf>, metadata: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            metadata: metadata.into(),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH, DEFAULT_METADATA_PATH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactFormat {
    Json,
    MessagePack,
}

impl ArtifactFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("msgpack") | Some("mpk") => Ok(Self::MessagePack),
            _ => Err(ModelError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Reads the artifact pair from disk.
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    paths: ArtifactPaths,
}

impl ModelStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Loads and validates the artifact. Any error here means the process
    /// must not serve traffic.
    pub fn load(&self) -> Result<ModelArtifact> {
        let model_path = &self.paths.model;
        let format = ArtifactFormat::from_path(model_path)?;

        tracing::info!(path = %model_path.display(), ?format, "Loading model");
        let bytes = read(model_path)?;
        let forest: RandomForest = match format {
            ArtifactFormat::Json => {
                serde_json::from_slice(&bytes).map_err(|source| ModelError::Json {
                    path: model_path.clone(),
                    source,
                })?
            }
            ArtifactFormat::MessagePack => {
                rmp_serde::from_slice(&bytes).map_err(|source| ModelError::MessagePack {
                    path: model_path.clone(),
                    source,
                })?
            }
        };

        let metadata = self.load_metadata()?;
        let artifact = ModelArtifact::from_parts(forest, metadata)?;

        tracing::info!(
            trees = artifact.forest().trees.len(),
            classes = ?artifact.classes(),
            accuracy = ?artifact.metadata().accuracy,
            "Model loaded successfully"
        );
        Ok(artifact)
    }

    fn load_metadata(&self) -> Result<Option<ModelMetadata>> {
        let path = &self.paths.metadata;
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "Metadata file not found, deriving metadata from the model"
                );
                return Ok(None);
            }
            Err(source) => {
                return Err(ModelError::Io {
                    path: path.clone(),
                    source,
                });
            }
        };

        let metadata = serde_json::from_slice(&bytes).map_err(|source| ModelError::Json {
            path: path.clone(),
            source,
        })?;
        Ok(Some(metadata))
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{DecisionTree, TreeNode};
    use std::fs;
    use tempfile::TempDir;

    fn labels() -> Vec<String> {
        ["setosa", "versicolor", "virginica"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn forest() -> RandomForest {
        RandomForest {
            n_features: 4,
            classes: labels(),
            trees: vec![DecisionTree::new(vec![
                TreeNode::Split {
                    feature: 2,
                    threshold: 2.45,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: vec![40.0, 0.0, 0.0],
                },
                TreeNode::Leaf {
                    value: vec![0.0, 40.0, 40.0],
                },
            ])],
        }
    }

    fn metadata() -> ModelMetadata {
        ModelMetadata {
            feature_names: vec![
                "sepal length (cm)".to_string(),
                "sepal width (cm)".to_string(),
                "petal length (cm)".to_string(),
                "petal width (cm)".to_string(),
            ],
            target_names: labels(),
            accuracy: Some(0.95),
            n_features: 4,
        }
    }

    fn write_pair(
        dir: &TempDir,
        model_name: &str,
        model: &[u8],
        meta: Option<&ModelMetadata>,
    ) -> ArtifactPaths {
        let paths = ArtifactPaths::new(
            dir.path().join(model_name),
            dir.path().join("metadata.json"),
        );
        fs::write(&paths.model, model).unwrap();
        if let Some(meta) = meta {
            fs::write(&paths.metadata, serde_json::to_vec(meta).unwrap()).unwrap();
        }
        paths
    }

    #[test]
    fn loads_json_pair() {
        let dir = TempDir::new().unwrap();
        let bytes = serde_json::to_vec(&forest()).unwrap();
        let paths = write_pair(&dir, "model.json", &bytes, Some(&metadata()));

        let artifact = ModelStore::new(paths).load().unwrap();
        assert_eq!(artifact.classes(), labels().as_slice());
        assert_eq!(artifact.metadata(), &metadata());
        assert_eq!(artifact.forest(), &forest());
    }

    #[test]
    fn loads_messagepack_model() {
        let dir = TempDir::new().unwrap();
        let bytes = rmp_serde::to_vec_named(&forest()).unwrap();
        let paths = write_pair(&dir, "model.msgpack", &bytes, Some(&metadata()));

        let artifact = ModelStore::new(paths).load().unwrap();
        assert_eq!(artifact.forest(), &forest());
    }

    #[test]
    fn missing_model_is_io_error() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(
            dir.path().join("absent.json"),
            dir.path().join("meta.json"),
        );

        let err = ModelStore::new(paths).load().unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }), "{err}");
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn corrupt_model_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let paths = write_pair(&dir, "model.json", b"{not json", Some(&metadata()));

        let err = ModelStore::new(paths).load().unwrap_err();
        assert!(matches!(err, ModelError::Json { .. }), "{err}");
    }

    #[test]
    fn corrupt_messagepack_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let paths = write_pair(&dir, "model.mpk", &[0xc1, 0x00, 0xff], Some(&metadata()));

        let err = ModelStore::new(paths).load().unwrap_err();
        assert!(matches!(err, ModelError::MessagePack { .. }), "{err}");
        assert!(err.to_string().contains("model.mpk"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let paths = write_pair(&dir, "model.joblib", b"", Some(&metadata()));

        let err = ModelStore::new(paths).load().unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedFormat { .. }));
    }

    #[test]
    fn label_order_must_match_metadata() {
        let dir = TempDir::new().unwrap();
        let mut meta = metadata();
        meta.target_names.swap(1, 2);
        let bytes = serde_json::to_vec(&forest()).unwrap();
        let paths = write_pair(&dir, "model.json", &bytes, Some(&meta));

        let err = ModelStore::new(paths).load().unwrap_err();
        assert!(matches!(err, ModelError::LabelMismatch { .. }), "{err}");
    }

    #[test]
    fn feature_counts_must_agree() {
        let mut meta = metadata();
        meta.feature_names.pop();
        let err = ModelArtifact::from_parts(forest(), Some(meta)).unwrap_err();
        assert!(matches!(err, ModelError::FeatureCountMismatch { .. }));

        let mut narrow = forest();
        narrow.n_features = 3;
        let err = ModelArtifact::from_parts(narrow, None).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureCountMismatch {
                expected: 4,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn accuracy_out_of_range_is_rejected() {
        let mut meta = metadata();
        meta.accuracy = Some(1.5);

        assert!(ModelArtifact::from_parts(forest(), Some(meta)).is_err());
    }

    #[test]
    fn missing_metadata_is_derived() {
        let dir = TempDir::new().unwrap();
        let bytes = serde_json::to_vec(&forest()).unwrap();
        let paths = write_pair(&dir, "model.json", &bytes, None);

        let artifact = ModelStore::new(paths).load().unwrap();
        let meta = artifact.metadata();
        assert_eq!(meta.target_names, labels());
        assert_eq!(meta.n_features, 4);
        assert_eq!(meta.feature_names[0], "feature_0");
        assert_eq!(meta.accuracy, None);
    }

    #[test]
    fn default_paths_point_at_model_dir() {
        let paths = ArtifactPaths::default();
        assert_eq!(paths.model, PathBuf::from("model/iris_model.json"));
        assert_eq!(paths.metadata, PathBuf::from("model/metadata.json"));
    }
}
