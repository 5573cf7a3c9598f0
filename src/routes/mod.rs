// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::collector::Collector;
use crate::docker_repo::RuntimeGateway;

pub(crate) struct AppState<G> {
    pub(crate) collector: Arc<Collector<G>>,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector.clone(),
        }
    }
}

pub fn app<G: RuntimeGateway>(collector: Arc<Collector<G>>) -> Router {
    let state = AppState { collector };
    Router::new()
        .route("/", get(http::index_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/metrics", get(http::metrics_handler::<G>)) // GET /metrics
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
