use crate::routes;
use crate::schemas::{
    BatchPredictionInput, BatchPredictionOutput, HealthResponse, ModelInfo, PredictionInput,
    PredictionOutput, RootResponse,
};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Iris Classification API",
        description = "Iris species classification with a pre-trained random forest",
        version = "1.0.0"
    ),
    paths(
        routes::root::root,
        routes::health::health,
        routes::predict::predict,
        routes::predict::predict_batch,
    ),
    components(schemas(
        PredictionInput,
        BatchPredictionInput,
        PredictionOutput,
        BatchPredictionOutput,
        HealthResponse,
        ModelInfo,
        RootResponse,
    )),
    tags(
        (name = "info", description = "Service information"),
        (name = "health", description = "Model status"),
        (name = "prediction", description = "Single and batch inference"),
    )
)]
pub struct ApiDoc;

#[tracing::instrument(name = "GET /openapi.json")]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
