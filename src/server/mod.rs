//! HTTP surface of the classification service.
//!
//! A single prediction route plus a liveness probe, with a fixed-origin
//! CORS policy and a bounded request body. The classifier is shared across
//! requests through the router state.

pub mod handlers;

use crate::classifier::Classify;
use crate::core::ClassifyError;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

/// Default upload size cap.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Maximum accepted request body size in bytes
    pub max_body_size: usize,
    /// Browser origins allowed by the CORS policy
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

/// Shared state handed to request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide classifier
    pub classifier: Arc<dyn Classify>,
}

/// Builds the router with all routes, limits, and middleware applied.
pub fn build_app(classifier: Arc<dyn Classify>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(create_cors_layer(config.cors_allowed_origins.clone()))
        .with_state(AppState { classifier })
}

/// Binds the listener and serves until ctrl-c or SIGTERM.
pub async fn serve(
    config: ServerConfig,
    classifier: Arc<dyn Classify>,
) -> Result<(), ClassifyError> {
    let app = build_app(classifier, &config);

    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn create_cors_layer(allowed_origins: Vec<String>) -> tower_http::cors::CorsLayer {
    use tower_http::cors::Any;

    let origins: Vec<http::HeaderValue> = allowed_origins
        .into_iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    tower_http::cors::CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
