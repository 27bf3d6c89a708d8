//! Request and response bodies

use crate::extract::{Validate, ValidationError};
use crate::state::Limits;
use iris_model::{ClassProbabilities, FeatureVector, ModelMetadata, PredictionResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Measurements of one flower, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionInput {
    #[schema(minimum = 0.0, example = 5.1)]
    pub sepal_length: f64,
    #[schema(minimum = 0.0, example = 3.5)]
    pub sepal_width: f64,
    #[schema(minimum = 0.0, example = 1.4)]
    pub petal_length: f64,
    #[schema(minimum = 0.0, example = 0.2)]
    pub petal_width: f64,
}

impl From<PredictionInput> for FeatureVector {
    fn from(input: PredictionInput) -> Self {
        FeatureVector::new(
            input.sepal_length,
            input.sepal_width,
            input.petal_length,
            input.petal_width,
        )
    }
}

impl Validate for PredictionInput {
    fn validate(&self, _limits: &Limits) -> Result<(), ValidationError> {
        for (field, value) in FeatureVector::from(*self).named() {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::new(
                    field,
                    format!("must be a non-negative number, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchPredictionInput {
    pub instances: Vec<PredictionInput>,
}

impl Validate for BatchPredictionInput {
    fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        if self.instances.len() > limits.max_batch_size {
            return Err(ValidationError::new(
                "instances",
                format!(
                    "batch of {} exceeds the limit of {}",
                    self.instances.len(),
                    limits.max_batch_size
                ),
            ));
        }
        for (i, instance) in self.instances.iter().enumerate() {
            instance
                .validate(limits)
                .map_err(|e| e.within(format!("instances[{i}]")))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PredictionOutput {
    #[schema(example = "setosa")]
    pub predicted_class: String,
    #[schema(minimum = 0.0, maximum = 1.0, example = 1.0)]
    pub confidence: f64,
    /// Probability per class label, in model label order
    #[schema(value_type = Object)]
    pub probabilities: ClassProbabilities,
}

impl From<PredictionResult> for PredictionOutput {
    fn from(result: PredictionResult) -> Self {
        Self {
            predicted_class: result.predicted_class,
            confidence: result.confidence,
            probabilities: result.probabilities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchPredictionOutput {
    pub predictions: Vec<PredictionOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ModelInfo {
    pub accuracy: Option<f64>,
    pub features: Vec<String>,
    pub classes: Vec<String>,
    pub n_features: usize,
}

impl From<&ModelMetadata> for ModelInfo {
    fn from(metadata: &ModelMetadata) -> Self {
        Self {
            accuracy: metadata.accuracy,
            features: metadata.feature_names.clone(),
            classes: metadata.target_names.clone(),
            n_features: metadata.n_features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub model_loaded: bool,
    pub model_info: ModelInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub docs: String,
    pub health: String,
}
