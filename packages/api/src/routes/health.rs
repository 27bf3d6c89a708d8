use crate::schemas::{HealthResponse, ModelInfo};
use crate::state::AppState;
use axum::extract::State;
use axum::{Json, Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service status and model details", body = HealthResponse)
    )
)]
#[tracing::instrument(name = "GET /health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.inference.is_loaded();
    if !model_loaded {
        tracing::warn!("Health check found no usable model");
    }

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unhealthy" }.to_string(),
        model_loaded,
        model_info: ModelInfo::from(state.inference.model_info()),
    })
}
