//! HTTP surface for the iris classifier.
//!
//! Requests are parsed and validated into typed bodies at the boundary
//! ([`extract::ValidatedJson`]); only conforming input reaches the
//! [`iris_model::InferenceService`] held in [`state::State`].

use axum::{Router, routing::get};
use state::AppState;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

mod routes;

pub mod error;
pub mod extract;
pub mod openapi;
pub mod schemas;
pub mod state;

pub use axum;

pub fn construct_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root::root))
        .nest("/health", routes::health::routes())
        .nest("/predict", routes::predict::routes())
        .route("/openapi.json", get(openapi::openapi_json))
        .fallback(routes::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
