#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use axum::{Router, routing::get};
use dotenv::dotenv;
use iris_api::{construct_router, state::State};
use iris_model::{InferenceService, ModelStore};
use std::net::SocketAddr;
use std::sync::Arc;

mod config;
mod telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    telemetry::init_tracing();

    tracing::info!("Starting Iris Classification API");

    let config = config::Config::from_env()?;
    tracing::info!(
        "Loaded configuration: model={}, metadata={}, max_batch_size={}",
        config.artifact.model.display(),
        config.artifact.metadata.display(),
        config.limits.max_batch_size
    );

    telemetry::init_metrics()?;

    // Must succeed before the listener exists: no traffic without a model.
    let artifact = ModelStore::new(config.artifact.clone())
        .load()
        .inspect_err(|e| tracing::error!("Failed to load model: {}", e))?;

    let inference = InferenceService::new(Arc::new(artifact));
    let state = Arc::new(State::new(inference, config.limits));

    let app = Router::new()
        .route("/metrics", get(telemetry::metrics_handler))
        .merge(construct_router(state));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
