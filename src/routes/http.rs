// GET handlers: index, version, metrics

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::docker_repo::RuntimeGateway;
use crate::exposition::{CONTENT_TYPE, render};
use crate::version::{NAME, VERSION, banner};

pub(super) async fn index_handler() -> impl IntoResponse {
    banner()
}

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /metrics — runs one collection cycle. Partial per-container failures
/// still answer 200; failing to list containers answers 503.
pub(super) async fn metrics_handler<G: RuntimeGateway>(
    State(state): State<AppState<G>>,
) -> Response {
    match state.collector.collect().await {
        Ok(snapshot) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], render(&snapshot)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, operation = "collect", "metrics scrape failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("failed to collect container metrics: {}\n", e),
            )
                .into_response()
        }
    }
}
