use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::schemas::{
    BatchPredictionInput, BatchPredictionOutput, PredictionInput, PredictionOutput,
};
use crate::state::AppState;
use axum::extract::State;
use axum::{Json, Router, routing::post};
use iris_model::FeatureVector;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(predict))
        .route("/batch", post(predict_batch))
}

#[utoipa::path(
    post,
    path = "/predict",
    tag = "prediction",
    request_body = PredictionInput,
    responses(
        (status = 200, description = "Predicted class with its probability distribution", body = PredictionOutput),
        (status = 400, description = "Body is not valid JSON"),
        (status = 415, description = "Body is not declared as JSON"),
        (status = 422, description = "Missing, non-numeric or negative measurement"),
        (status = 500, description = "Inference failed")
    )
)]
#[tracing::instrument(name = "POST /predict", skip(state))]
pub async fn predict(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<PredictionInput>,
) -> Result<Json<PredictionOutput>, ApiError> {
    let features = FeatureVector::from(input);
    tracing::debug!(features = ?features.to_array(), "Predicting");

    let result = state.inference.predict(&features).inspect_err(|_| {
        metrics::counter!("prediction_errors_total").increment(1);
    })?;

    tracing::info!(
        predicted_class = %result.predicted_class,
        confidence = result.confidence,
        "Prediction"
    );
    metrics::counter!("predictions_total", "class" => result.predicted_class.clone())
        .increment(1);

    Ok(Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/predict/batch",
    tag = "prediction",
    request_body = BatchPredictionInput,
    responses(
        (status = 200, description = "One prediction per instance, in input order", body = BatchPredictionOutput),
        (status = 400, description = "Body is not valid JSON"),
        (status = 415, description = "Body is not declared as JSON"),
        (status = 422, description = "An instance is invalid or the batch is too large"),
        (status = 500, description = "Inference failed")
    )
)]
#[tracing::instrument(
    name = "POST /predict/batch",
    skip(state, input),
    fields(instances = input.instances.len())
)]
pub async fn predict_batch(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<BatchPredictionInput>,
) -> Result<Json<BatchPredictionOutput>, ApiError> {
    let batch: Vec<FeatureVector> = input
        .instances
        .into_iter()
        .map(FeatureVector::from)
        .collect();
    tracing::info!("Batch prediction for {} instances", batch.len());
    metrics::histogram!("prediction_batch_size").record(batch.len() as f64);

    let results = state.inference.predict_batch(&batch).inspect_err(|_| {
        metrics::counter!("prediction_errors_total").increment(1);
    })?;

    for result in &results {
        metrics::counter!("predictions_total", "class" => result.predicted_class.clone())
            .increment(1);
    }

    Ok(Json(BatchPredictionOutput {
        predictions: results.into_iter().map(PredictionOutput::from).collect(),
    }))
}
