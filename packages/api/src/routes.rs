use crate::error::ApiError;
use axum::http::Uri;

pub mod health;
pub mod predict;
pub mod root;

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
