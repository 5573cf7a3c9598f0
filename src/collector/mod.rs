// Collection cycle: discovery, per-container stages, aggregation

mod aggregate;
mod discovery;
mod fanout;
mod inspect;
mod logs;
mod resources;

pub use aggregate::aggregate;
pub use discovery::Discovery;
pub use fanout::FanOutLimits;
pub use inspect::parse_started_at;
pub use logs::count_lines;

use crate::config::AppConfig;
use crate::docker_repo::{NetworkSelection, RuntimeGateway};
use crate::error::{CollectError, GatewayError};
use crate::models::{LogMetricsMode, Snapshot};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Log stage options. `pattern` is only set when custom-pattern counting is on.
#[derive(Debug, Clone, Default)]
pub struct LogCollection {
    pub enabled: bool,
    pub pattern: Option<Regex>,
}

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub include_stopped: bool,
    pub limits: FanOutLimits,
    pub network: NetworkSelection,
    pub logs: LogCollection,
    pub start_time: bool,
}

impl CollectorSettings {
    /// Fails if the custom log pattern does not compile.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            include_stopped: config.collection.include_stopped,
            limits: FanOutLimits {
                max_concurrency: config.collection.max_concurrency,
                task_timeout: Duration::from_millis(config.collection.task_timeout_ms),
            },
            network: config.collection.network_interfaces,
            logs: LogCollection {
                enabled: config.logs.enabled,
                pattern: config.log_pattern()?,
            },
            start_time: config.collection.start_time,
        })
    }

    fn log_mode(&self) -> LogMetricsMode {
        LogMetricsMode {
            enabled: self.logs.enabled,
            matches: self.logs.enabled && self.logs.pattern.is_some(),
        }
    }
}

/// Runs one collection cycle per call against a runtime gateway. Holds no
/// state between cycles.
pub struct Collector<G> {
    gateway: Arc<G>,
    settings: CollectorSettings,
    hostname: String,
}

impl<G: RuntimeGateway> Collector<G> {
    pub fn new(gateway: Arc<G>, settings: CollectorSettings, hostname: impl Into<String>) -> Self {
        Self {
            gateway,
            settings,
            hostname: hostname.into(),
        }
    }

    /// Builds a collector labelled with the host name the runtime reports.
    pub async fn with_runtime_hostname(
        gateway: Arc<G>,
        settings: CollectorSettings,
    ) -> Result<Self, GatewayError> {
        let hostname = gateway.host_name().await?;
        Ok(Self::new(gateway, settings, hostname))
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Collects a fresh snapshot. Only a discovery failure is an error;
    /// per-container failures leave the corresponding samples absent.
    #[instrument(skip(self), fields(hostname = %self.hostname))]
    pub async fn collect(&self) -> Result<Snapshot, CollectError> {
        let started = Instant::now();
        let limits = self.settings.limits;

        let discovery = discovery::discover(
            self.gateway.as_ref(),
            self.settings.include_stopped,
            limits.task_timeout,
        )
        .await?;
        let ids = discovery.ids();

        let resources =
            resources::collect_resources(&self.gateway, &ids, limits, self.settings.network).await;

        let logs = if self.settings.logs.enabled {
            logs::collect_logs(
                &self.gateway,
                &ids,
                limits,
                self.settings.logs.pattern.as_ref(),
            )
            .await
        } else {
            HashMap::new()
        };

        let starts = if self.settings.start_time {
            inspect::collect_start_times(&self.gateway, &ids, limits).await
        } else {
            HashMap::new()
        };

        let (n_resources, n_logs, n_starts) = (resources.len(), logs.len(), starts.len());
        let snapshot = aggregate(
            &self.hostname,
            discovery,
            resources,
            logs,
            starts,
            self.settings.log_mode(),
        );
        tracing::debug!(
            containers = snapshot.len(),
            running = snapshot.running(),
            stopped = snapshot.stopped(),
            resource_samples = n_resources,
            log_samples = n_logs,
            start_samples = n_starts,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection cycle finished"
        );
        Ok(snapshot)
    }
}
