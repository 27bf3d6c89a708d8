use crate::schemas::RootResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/",
    tag = "info",
    responses(
        (status = 200, description = "Service is running", body = RootResponse)
    )
)]
#[tracing::instrument(name = "GET /")]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Iris Classification API".to_string(),
        status: "running".to_string(),
        docs: "/openapi.json".to_string(),
        health: "/health".to_string(),
    })
}
