// Joined result of one collection cycle

use super::{ContainerInfo, LogSample, ResourceSample, StartSample};

/// Which log families the cycle collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogMetricsMode {
    pub enabled: bool,
    pub matches: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub info: ContainerInfo,
    pub resources: Option<ResourceSample>,
    pub logs: Option<LogSample>,
    pub started: Option<StartSample>,
}

/// Immutable once built; entries follow the discovery order of running containers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    hostname: String,
    running: usize,
    stopped: usize,
    log_mode: LogMetricsMode,
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn new(
        hostname: impl Into<String>,
        running: usize,
        stopped: usize,
        log_mode: LogMetricsMode,
        entries: Vec<SnapshotEntry>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            running,
            stopped,
            log_mode,
            entries,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn stopped(&self) -> usize {
        self.stopped
    }

    pub fn log_mode(&self) -> LogMetricsMode {
        self.log_mode
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.info.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.info.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
