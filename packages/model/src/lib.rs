//! Model store and inference for the iris classification service.
//!
//! The crate has no knowledge of HTTP. A [`ModelStore`] reads the artifact
//! pair from disk once, producing an immutable [`ModelArtifact`]; an
//! [`InferenceService`] shares that artifact behind an `Arc` and turns
//! [`FeatureVector`]s into [`PredictionResult`]s.

pub mod artifact;
pub mod error;
pub mod features;
pub mod forest;
pub mod inference;

pub use artifact::{ArtifactPaths, ModelArtifact, ModelMetadata, ModelStore};
pub use error::{ModelError, Result};
pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
pub use forest::{DecisionTree, RandomForest, TreeNode};
pub use inference::{ClassProbabilities, InferenceService, PredictionResult};
