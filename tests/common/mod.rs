// Shared test helpers: an in-memory runtime gateway

#![allow(dead_code)]

use docker_exporter::collector::{Collector, CollectorSettings, FanOutLimits, LogCollection};
use docker_exporter::docker_repo::{LogStream, NetworkSelection, RuntimeGateway};
use docker_exporter::error::GatewayError;
use docker_exporter::models::ContainerRecord;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct FakeGateway {
    pub containers: Vec<ContainerRecord>,
    pub stats: HashMap<String, Value>,
    pub logs: HashMap<(String, LogStream), Vec<u8>>,
    pub started_at: HashMap<String, String>,
    pub fail_list: bool,
    /// List call never returns in practice.
    pub hang_list: bool,
    pub fail_stats: HashSet<String>,
    pub fail_logs: HashSet<(String, LogStream)>,
    /// Ids whose stats call never returns in practice.
    pub hang_stats: HashSet<String>,
    pub stats_delay: Duration,
    pub stats_in_flight: AtomicUsize,
    pub stats_peak: AtomicUsize,
    pub stats_calls: AtomicUsize,
    pub log_calls: AtomicUsize,
    pub inspect_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn with_container(mut self, id: &str, name: &str, state: &str) -> Self {
        self.containers.push(ContainerRecord {
            id: id.into(),
            names: vec![format!("/{}", name)],
            state: state.into(),
            status: format!("{} for a while", state),
        });
        self
    }

    pub fn with_stats(mut self, id: &str, doc: Value) -> Self {
        self.stats.insert(id.into(), doc);
        self
    }

    pub fn with_logs(mut self, id: &str, stream: LogStream, buf: &str) -> Self {
        self.logs.insert((id.into(), stream), buf.as_bytes().to_vec());
        self
    }

    pub fn with_started_at(mut self, id: &str, ts: &str) -> Self {
        self.started_at.insert(id.into(), ts.into());
        self
    }
}

impl RuntimeGateway for FakeGateway {
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerRecord>, GatewayError> {
        if self.hang_list {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_list {
            return Err(GatewayError::Other("daemon unreachable".into()));
        }
        Ok(self
            .containers
            .iter()
            .filter(|c| all || c.state == "running")
            .cloned()
            .collect())
    }

    async fn stats(&self, id: &str) -> Result<Value, GatewayError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.stats_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats_peak.fetch_max(now, Ordering::SeqCst);
        if self.hang_stats.contains(id) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        } else if !self.stats_delay.is_zero() {
            tokio::time::sleep(self.stats_delay).await;
        }
        self.stats_in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.fail_stats.contains(id) {
            return Err(GatewayError::Other(format!("no such container: {}", id)));
        }
        self.stats
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::Other(format!("no stats for {}", id)))
    }

    async fn logs(&self, id: &str, stream: LogStream) -> Result<Vec<u8>, GatewayError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        let key = (id.to_string(), stream);
        if self.fail_logs.contains(&key) {
            return Err(GatewayError::Other(format!("{} logs unavailable", stream.as_str())));
        }
        Ok(self.logs.get(&key).cloned().unwrap_or_default())
    }

    async fn started_at(&self, id: &str) -> Result<Option<String>, GatewayError> {
        self.inspect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.started_at.get(id).cloned())
    }

    async fn host_name(&self) -> Result<String, GatewayError> {
        Ok("test-host".into())
    }
}

pub fn settings() -> CollectorSettings {
    CollectorSettings {
        include_stopped: true,
        limits: FanOutLimits {
            max_concurrency: 8,
            task_timeout: Duration::from_secs(5),
        },
        network: NetworkSelection::First,
        logs: LogCollection::default(),
        start_time: true,
    }
}

pub fn collector(gateway: FakeGateway, settings: CollectorSettings) -> Collector<FakeGateway> {
    Collector::new(Arc::new(gateway), settings, "test-host")
}

/// Stats document for the `/web` scenario.
pub fn web_stats() -> Value {
    json!({
        "cpu_stats": { "cpu_usage": {
            "total_usage": 5_000_000_000u64,
            "usage_in_usermode": 4_000_000_000u64,
            "usage_in_kernelmode": 1_000_000_000u64
        }},
        "memory_stats": { "usage": 104857600u64, "limit": 536870912u64 },
        "networks": { "eth0": { "rx_bytes": 1000, "rx_packets": 10, "tx_bytes": 400, "tx_packets": 4 } },
        "blkio_stats": { "io_service_bytes_recursive": [ { "op": "read", "value": 2048 } ] },
        "pids_stats": { "current": 3 }
    })
}
