// Error types for the runtime gateway and the collection cycle

use std::time::Duration;
use thiserror::Error;

/// Failure talking to the container runtime.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("docker API error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("invalid JSON from runtime: {0}")]
    Json(#[from] serde_json::Error),

    /// The runtime closed the response without sending a document.
    #[error("empty {operation} response for container {id}")]
    EmptyResponse { operation: &'static str, id: String },

    /// Used by non-Docker gateways (and test doubles).
    #[error("{0}")]
    Other(String),
}

/// Failure of a collection cycle or of a single per-container task.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Listing containers failed; the whole cycle is unusable.
    #[error("container discovery failed: {0}")]
    Discovery(#[source] GatewayError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed {0} document")]
    Malformed(&'static str),

    #[error("container has no start timestamp")]
    MissingStartTime,

    #[error("invalid start timestamp {value:?}: {source}")]
    StartTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
