// Fan-in: join the stage outputs by container id into one snapshot

use super::discovery::Discovery;
use crate::models::{
    LogMetricsMode, LogSample, ResourceSample, Snapshot, SnapshotEntry, StartSample,
};
use std::collections::HashMap;

/// Builds the cycle's snapshot, keyed by the discovery working set.
///
/// Ids missing from a stage's output get `None` for that sample; stage
/// results for ids outside the working set are dropped.
pub fn aggregate(
    hostname: &str,
    discovery: Discovery,
    mut resources: HashMap<String, ResourceSample>,
    mut logs: HashMap<String, LogSample>,
    mut starts: HashMap<String, StartSample>,
    log_mode: LogMetricsMode,
) -> Snapshot {
    let entries = discovery
        .containers
        .into_iter()
        .map(|info| {
            let resources = resources.remove(&info.id);
            let logs = logs.remove(&info.id);
            let started = starts.remove(&info.id);
            SnapshotEntry {
                info,
                resources,
                logs,
                started,
            }
        })
        .collect();
    Snapshot::new(
        hostname,
        discovery.running,
        discovery.stopped,
        log_mode,
        entries,
    )
}
