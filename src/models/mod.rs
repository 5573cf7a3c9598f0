// Domain models for one collection cycle

mod container;
mod sample;
mod snapshot;

pub use container::{ContainerInfo, ContainerRecord, RUNNING_STATE};
pub use sample::{
    CpuUsage, Facet, IoUsage, LogSample, MemoryUsage, NetworkUsage, ResourceSample, StartSample,
    StreamCount,
};
pub use snapshot::{LogMetricsMode, Snapshot, SnapshotEntry};
