// Container runtime access: the gateway trait and its bollard implementation

mod stats;

pub use stats::NetworkSelection;
pub(crate) use stats::decode_stats;

use crate::error::GatewayError;
use crate::models::ContainerRecord;
use bollard::Docker;
use bollard::query_parameters::{
    InspectContainerOptions, ListContainersOptions, LogsOptions, StatsOptions,
};
use futures_util::StreamExt;
use std::future::Future;
use tracing::instrument;

/// Which output stream of a container to read logs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    pub fn as_str(self) -> &'static str {
        match self {
            LogStream::Stdout => "stdout",
            LogStream::Stderr => "stderr",
        }
    }
}

/// Operations the exporter needs from a container runtime.
pub trait RuntimeGateway: Send + Sync + 'static {
    /// Lists containers; `all` includes non-running ones.
    fn list_containers(
        &self,
        all: bool,
    ) -> impl Future<Output = Result<Vec<ContainerRecord>, GatewayError>> + Send;

    /// One-shot resource stats document for a container.
    fn stats(&self, id: &str)
    -> impl Future<Output = Result<serde_json::Value, GatewayError>> + Send;

    /// Full available log buffer of one stream.
    fn logs(
        &self,
        id: &str,
        stream: LogStream,
    ) -> impl Future<Output = Result<Vec<u8>, GatewayError>> + Send;

    /// Raw `State.StartedAt` value from the container's inspect data.
    fn started_at(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<String>, GatewayError>> + Send;

    /// Name the runtime reports for its host.
    fn host_name(&self) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Connects using `DOCKER_HOST` when set, otherwise the local socket.
    pub fn connect() -> Result<Self, GatewayError> {
        let docker = Docker::connect_with_defaults()?;
        Ok(Self { docker })
    }
}

impl RuntimeGateway for DockerRepo {
    #[instrument(skip(self), fields(repo = "docker", operation = "list_containers"))]
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerRecord>, GatewayError> {
        let options = ListContainersOptions {
            all,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        Ok(containers
            .into_iter()
            .map(|c| ContainerRecord {
                id: c.id.unwrap_or_default(),
                names: c.names.unwrap_or_default(),
                state: c.state.map(|s| s.to_string()).unwrap_or_default(),
                status: c.status.unwrap_or_default(),
            })
            .collect())
    }

    async fn stats(&self, id: &str) -> Result<serde_json::Value, GatewayError> {
        let options = StatsOptions {
            stream: false,
            one_shot: true,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        match stream.next().await {
            Some(response) => Ok(serde_json::to_value(response?)?),
            None => Err(GatewayError::EmptyResponse {
                operation: "stats",
                id: id.to_string(),
            }),
        }
    }

    async fn logs(&self, id: &str, stream: LogStream) -> Result<Vec<u8>, GatewayError> {
        let options = LogsOptions {
            stdout: stream == LogStream::Stdout,
            stderr: stream == LogStream::Stderr,
            tail: "all".to_string(),
            ..Default::default()
        };
        let mut frames = std::pin::pin!(self.docker.logs(id, Some(options)));
        let mut buf = Vec::new();
        while let Some(frame) = frames.next().await {
            buf.extend_from_slice(&frame?.into_bytes());
        }
        Ok(buf)
    }

    async fn started_at(&self, id: &str) -> Result<Option<String>, GatewayError> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        Ok(inspect.state.and_then(|s| s.started_at))
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "host_name"))]
    async fn host_name(&self) -> Result<String, GatewayError> {
        let info = self.docker.info().await?;
        Ok(info.name.unwrap_or_default())
    }
}
