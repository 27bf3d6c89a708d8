use crate::artifact::{ModelArtifact, ModelMetadata};
use crate::error::{ModelError, Result};
use crate::features::{FEATURE_COUNT, FeatureVector};
use ndarray::{Array2, ArrayView1};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Per-class probabilities, kept in the artifact's label order.
///
/// Serializes as a JSON object whose keys follow that order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities(Vec<(String, f64)>);

impl ClassProbabilities {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, p)| (name.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, p)| p).sum()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, p) in &self.0 {
            map.serialize_entry(label, p)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PredictionResult {
    pub predicted_class: String,
    /// Probability of `predicted_class`
    pub confidence: f64,
    pub probabilities: ClassProbabilities,
}

/// Shared, read-only handle to the loaded model.
#[derive(Debug, Clone)]
pub struct InferenceService {
    artifact: Arc<ModelArtifact>,
}

impl InferenceService {
    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Whether the service holds a usable forest. A constructed service
    /// always wraps a validated artifact, so this only turns false if that
    /// guarantee is broken.
    pub fn is_loaded(&self) -> bool {
        let forest = self.artifact.forest();
        !forest.trees.is_empty() && !forest.classes.is_empty()
    }

    pub fn model_info(&self) -> &ModelMetadata {
        self.artifact.metadata()
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let values = features.to_array();
        let proba = self
            .artifact
            .forest()
            .predict_proba(ArrayView1::from(&values[..]))?;
        self.interpret(proba.view())
    }

    /// Predicts every input independently; output order follows input order.
    pub fn predict_batch(&self, batch: &[FeatureVector]) -> Result<Vec<PredictionResult>> {
        let flat: Vec<f64> = batch.iter().flat_map(|f| f.to_array()).collect();
        let x = Array2::from_shape_vec((batch.len(), FEATURE_COUNT), flat)
            .map_err(|e| ModelError::Inference(format!("batch shape: {e}")))?;

        let proba = self.artifact.forest().predict_proba_batch(x.view())?;
        proba
            .rows()
            .into_iter()
            .map(|row| self.interpret(row))
            .collect()
    }

    fn interpret(&self, proba: ArrayView1<f64>) -> Result<PredictionResult> {
        let classes = self.artifact.classes();
        if proba.len() != classes.len() {
            return Err(ModelError::Inference(format!(
                "model produced {} probabilities for {} classes",
                proba.len(),
                classes.len()
            )));
        }

        // first maximum wins on ties
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }

        let confidence = proba[best];
        if !confidence.is_finite() {
            return Err(ModelError::Inference(
                "model produced a non-finite probability".to_string(),
            ));
        }

        Ok(PredictionResult {
            predicted_class: classes[best].clone(),
            confidence,
            probabilities: ClassProbabilities(
                classes.iter().cloned().zip(proba.iter().copied()).collect(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{DecisionTree, RandomForest, TreeNode};

    fn service() -> InferenceService {
        let forest = RandomForest {
            n_features: 4,
            classes: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            trees: vec![DecisionTree::new(vec![
                TreeNode::Split {
                    feature: 3,
                    threshold: 1.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: vec![0.0, 1.0, 1.0],
                },
                TreeNode::Leaf {
                    value: vec![1.0, 2.0, 1.0],
                },
            ])],
        };
        let artifact = ModelArtifact::from_parts(forest, None).unwrap();
        InferenceService::new(Arc::new(artifact))
    }

    #[test]
    fn ties_resolve_to_the_first_label() {
        let result = service()
            .predict(&FeatureVector::new(0.0, 0.0, 0.0, 0.5))
            .unwrap();

        assert_eq!(result.predicted_class, "b");
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.probabilities.get("a"), Some(0.0));
        assert_eq!(result.probabilities.get("c"), Some(0.5));
    }

    #[test]
    fn confidence_is_the_largest_probability() {
        let result = service()
            .predict(&FeatureVector::new(0.0, 0.0, 0.0, 2.0))
            .unwrap();

        let max = result
            .probabilities
            .iter()
            .map(|(_, p)| p)
            .fold(f64::MIN, f64::max);
        assert_eq!(result.predicted_class, "b");
        assert_eq!(result.confidence, max);
        assert!((result.probabilities.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constructed_service_is_loaded() {
        let service = service();

        assert!(service.is_loaded());
        assert_eq!(service.model_info().target_names, ["a", "b", "c"]);
    }

    #[test]
    fn empty_batch_yields_no_results() {
        assert!(service().predict_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn probabilities_serialize_in_label_order() {
        let result = service()
            .predict(&FeatureVector::new(0.0, 0.0, 0.0, 2.0))
            .unwrap();
        let json = serde_json::to_string(&result.probabilities).unwrap();

        assert_eq!(json, r#"{"a":0.25,"b":0.5,"c":0.25}"#);
    }
}
