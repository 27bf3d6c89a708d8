//! Error types for artifact loading and inference

use std::path::PathBuf;
use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while loading an artifact or evaluating it
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact file missing or unreadable
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact file is not valid JSON for the expected shape
    #[error("Failed to decode JSON artifact {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Artifact file is not valid MessagePack for the expected shape
    #[error("Failed to decode MessagePack artifact {}: {source}", path.display())]
    MessagePack {
        path: PathBuf,
        #[source]
        source: rmp_serde::decode::Error,
    },

    /// File extension does not name a known encoding
    #[error("Unsupported artifact format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Artifact decoded but violates a structural rule
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Class labels in the model and the metadata disagree
    #[error("Class label mismatch: model has {model:?}, metadata has {metadata:?}")]
    LabelMismatch {
        model: Vec<String>,
        metadata: Vec<String>,
    },

    /// Feature counts disagree between two sources
    #[error("Feature count mismatch in {context}: expected {expected}, found {found}")]
    FeatureCountMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// Evaluation failed on a loaded model
    #[error("Inference failed: {0}")]
    Inference(String),
}
