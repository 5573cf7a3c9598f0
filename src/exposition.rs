// Prometheus text exposition (format 0.0.4) for a collection snapshot

use crate::models::{Facet, LogMetricsMode, Snapshot, SnapshotEntry};
use std::fmt::Display;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}

struct Family {
    name: &'static str,
    help: &'static str,
    kind: MetricType,
}

const fn counter(name: &'static str, help: &'static str) -> Family {
    Family {
        name,
        help,
        kind: MetricType::Counter,
    }
}

const fn gauge(name: &'static str, help: &'static str) -> Family {
    Family {
        name,
        help,
        kind: MetricType::Gauge,
    }
}

const CONTAINERS_UP: Family = gauge("docker_containers_up_count", "Number of running containers");
const CONTAINERS_DOWN: Family =
    gauge("docker_containers_down_count", "Number of stopped containers");

const CPU_TOTAL: Family = counter(
    "docker_cpu_usage_total",
    "Total CPU usage (user and kernel) in seconds",
);
const CPU_USER: Family = counter("docker_cpu_usage_user", "User CPU usage in seconds");
const CPU_KERNEL: Family = counter("docker_cpu_usage_kernel", "Kernel CPU usage in seconds");

const MEMORY_LIMIT: Family = gauge("docker_memory_total", "Total memory size in bytes");
const MEMORY_USAGE: Family = gauge("docker_memory_usage", "Usage memory size in bytes");

const NET_RX_BYTES: Family = counter(
    "docker_network_received_bytes",
    "Number of bytes received on the network",
);
const NET_RX_PACKETS: Family = counter(
    "docker_network_received_packages",
    "Number of packages received on the network",
);
const NET_TX_BYTES: Family = counter(
    "docker_network_transmit_bytes",
    "Number of bytes transmitted on the network",
);
const NET_TX_PACKETS: Family = counter(
    "docker_network_transmit_packages",
    "Number of packages transmitted on the network",
);

const IO_READ: Family = counter(
    "docker_io_read_bytes",
    "Number of bytes read by the block device",
);
const IO_WRITE: Family = counter(
    "docker_io_write_bytes",
    "Number of bytes written by the block device",
);

const PIDS: Family = gauge(
    "docker_process_pids_count",
    "Number of running processes and threads",
);

const LOGS_STDOUT: Family = counter("docker_logs_stdout_count", "Number of logs from stdout stream");
const LOGS_STDERR: Family = counter("docker_logs_stderr_count", "Number of logs from stderr stream");
const LOGS_ALL: Family = counter("docker_logs_all_count", "Number of logs from all streams");
const LOGS_CUSTOM: Family = counter(
    "docker_logs_custom_count",
    "Number of logs containing custom regular expression from all streams (by default, containing the error level)",
);

const STARTED: Family = gauge("docker_started_time", "Container started time");

const PARTIAL: Family = gauge(
    "docker_stats_partial",
    "Set for each facet that was reported but had fields defaulted to zero",
);

/// Escapes a label value: backslash, double quote and newline.
fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

fn push_family(out: &mut Vec<String>, family: &Family, labels: &str, value: impl Display) {
    out.push(format!("# HELP {} {}", family.name, family.help));
    out.push(format!("# TYPE {} {}", family.name, family.kind.as_str()));
    out.push(format!("{}{{{}}} {}", family.name, labels, value));
}

fn encode_container(out: &mut Vec<String>, entry: &SnapshotEntry, host: &str, mode: LogMetricsMode) {
    let labels = format!(
        "containerId=\"{}\",containerName=\"{}\",hostname=\"{}\"",
        escape_label(&entry.info.id),
        escape_label(&entry.info.name),
        host
    );
    let mut partial: Vec<Facet> = Vec::new();

    if let Some(r) = &entry.resources {
        if let Some(cpu) = &r.cpu {
            push_family(out, &CPU_TOTAL, &labels, cpu.total_seconds);
            push_family(out, &CPU_USER, &labels, cpu.user_seconds);
            push_family(out, &CPU_KERNEL, &labels, cpu.kernel_seconds);
        }
        if let Some(mem) = &r.memory {
            push_family(out, &MEMORY_LIMIT, &labels, mem.limit_bytes);
            push_family(out, &MEMORY_USAGE, &labels, mem.usage_bytes);
        }
        if let Some(net) = &r.network {
            push_family(out, &NET_RX_BYTES, &labels, net.rx_bytes);
            push_family(out, &NET_RX_PACKETS, &labels, net.rx_packets);
            push_family(out, &NET_TX_BYTES, &labels, net.tx_bytes);
            push_family(out, &NET_TX_PACKETS, &labels, net.tx_packets);
        }
        if let Some(io) = &r.io {
            push_family(out, &IO_READ, &labels, io.read_bytes);
            push_family(out, &IO_WRITE, &labels, io.write_bytes);
        }
        if let Some(pids) = r.pids {
            push_family(out, &PIDS, &labels, pids);
        }
        partial.extend(r.partial.iter().copied());
    }

    if mode.enabled
        && let Some(logs) = &entry.logs
    {
        push_family(out, &LOGS_STDOUT, &labels, logs.stdout_lines);
        push_family(out, &LOGS_STDERR, &labels, logs.stderr_lines);
        push_family(out, &LOGS_ALL, &labels, logs.total_lines);
        if mode.matches {
            push_family(out, &LOGS_CUSTOM, &labels, logs.total_matches);
        }
        if logs.partial {
            partial.push(Facet::Logs);
        }
    }

    if let Some(started) = &entry.started {
        push_family(out, &STARTED, &labels, started.started_at_unix_seconds);
    }

    if !partial.is_empty() {
        out.push(format!("# HELP {} {}", PARTIAL.name, PARTIAL.help));
        out.push(format!("# TYPE {} {}", PARTIAL.name, PARTIAL.kind.as_str()));
        for facet in partial {
            out.push(format!(
                "{}{{{},facet=\"{}\"}} 1",
                PARTIAL.name,
                labels,
                facet.as_str()
            ));
        }
    }

    out.push(String::new());
}

/// Renders a snapshot as exposition lines: the two host gauges, then one
/// block per running container. Families whose sample is absent are omitted.
pub fn encode(snapshot: &Snapshot) -> Vec<String> {
    let host = escape_label(snapshot.hostname());
    let host_labels = format!("hostname=\"{}\"", host);
    let mut out = Vec::new();

    push_family(&mut out, &CONTAINERS_UP, &host_labels, snapshot.running());
    push_family(&mut out, &CONTAINERS_DOWN, &host_labels, snapshot.stopped());
    out.push(String::new());

    for entry in snapshot.entries() {
        encode_container(&mut out, entry, &host, snapshot.log_mode());
    }
    out
}

/// `encode` joined into a response body, one line per `\n`.
pub fn render(snapshot: &Snapshot) -> String {
    let mut body = String::new();
    for line in encode(snapshot) {
        body.push_str(&line);
        body.push('\n');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContainerInfo, CpuUsage, IoUsage, LogSample, MemoryUsage, NetworkUsage, ResourceSample,
        StartSample,
    };

    fn info(id: &str, name: &str) -> ContainerInfo {
        ContainerInfo {
            id: id.into(),
            name: name.into(),
            state: "running".into(),
            status: "Up".into(),
        }
    }

    fn full_resources(id: &str) -> ResourceSample {
        ResourceSample {
            id: id.into(),
            cpu: Some(CpuUsage {
                total_seconds: 5.0,
                user_seconds: 3.5,
                kernel_seconds: 1.5,
            }),
            memory: Some(MemoryUsage {
                limit_bytes: 536_870_912,
                usage_bytes: 104_857_600,
            }),
            network: Some(NetworkUsage {
                rx_bytes: 1000,
                ..Default::default()
            }),
            io: Some(IoUsage {
                read_bytes: 2048,
                write_bytes: 0,
            }),
            pids: Some(3),
            partial: vec![],
        }
    }

    fn snapshot(entries: Vec<SnapshotEntry>, mode: LogMetricsMode) -> Snapshot {
        let running = entries.len();
        Snapshot::new("node-1", running, 1, mode, entries)
    }

    fn lines_for<'a>(lines: &'a [String], id: &str) -> Vec<&'a String> {
        let needle = format!("containerId=\"{}\"", id);
        lines.iter().filter(|l| l.contains(&needle)).collect()
    }

    #[test]
    fn host_gauges_come_first() {
        let lines = encode(&snapshot(vec![], LogMetricsMode::default()));
        assert_eq!(
            lines,
            vec![
                "# HELP docker_containers_up_count Number of running containers",
                "# TYPE docker_containers_up_count gauge",
                "docker_containers_up_count{hostname=\"node-1\"} 0",
                "# HELP docker_containers_down_count Number of stopped containers",
                "# TYPE docker_containers_down_count gauge",
                "docker_containers_down_count{hostname=\"node-1\"} 1",
                "",
            ]
        );
    }

    #[test]
    fn full_block_has_help_type_and_sample_per_family() {
        let entry = SnapshotEntry {
            info: info("abc", "web"),
            resources: Some(full_resources("abc")),
            logs: None,
            started: Some(StartSample {
                id: "abc".into(),
                started_at_unix_seconds: 1_709_294_400.0,
            }),
        };
        let lines = encode(&snapshot(vec![entry], LogMetricsMode::default()));
        let labels = "{containerId=\"abc\",containerName=\"web\",hostname=\"node-1\"}";
        assert!(lines.contains(&"# HELP docker_cpu_usage_total Total CPU usage (user and kernel) in seconds".to_string()));
        assert!(lines.contains(&"# TYPE docker_cpu_usage_total counter".to_string()));
        assert!(lines.contains(&format!("docker_cpu_usage_total{} 5", labels)));
        assert!(lines.contains(&format!("docker_cpu_usage_user{} 3.5", labels)));
        assert!(lines.contains(&"# TYPE docker_memory_usage gauge".to_string()));
        assert!(lines.contains(&format!("docker_memory_usage{} 104857600", labels)));
        assert!(lines.contains(&format!("docker_io_read_bytes{} 2048", labels)));
        assert!(lines.contains(&format!("docker_started_time{} 1709294400", labels)));
        // 13 families, 3 lines each
        assert_eq!(lines_for(&lines, "abc").len(), 13);
        assert_eq!(lines.len(), 7 + 13 * 3 + 1);
        assert_eq!(lines.last().unwrap(), "");
        assert!(!lines.iter().any(|l| l.contains("docker_logs_")));
    }

    #[test]
    fn absent_memory_facet_emits_no_memory_lines() {
        let mut r = full_resources("abc");
        r.memory = None;
        let entry = SnapshotEntry {
            info: info("abc", "web"),
            resources: Some(r),
            logs: None,
            started: None,
        };
        let lines = encode(&snapshot(vec![entry], LogMetricsMode::default()));
        assert!(!lines.iter().any(|l| l.contains("docker_memory_")));
        assert!(lines.iter().any(|l| l.starts_with("docker_cpu_usage_total{")));
    }

    #[test]
    fn absent_samples_emit_an_empty_block() {
        let entry = SnapshotEntry {
            info: info("abc", "web"),
            resources: None,
            logs: None,
            started: None,
        };
        let lines = encode(&snapshot(vec![entry], LogMetricsMode::default()));
        assert!(lines_for(&lines, "abc").is_empty());
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn log_families_follow_the_mode() {
        let logs = LogSample::from_streams(
            "abc",
            Some(crate::models::StreamCount {
                lines: 4,
                matches: 1,
            }),
            Some(crate::models::StreamCount {
                lines: 2,
                matches: 2,
            }),
        );
        let entry = SnapshotEntry {
            info: info("abc", "web"),
            resources: None,
            logs,
            started: None,
        };

        let off = encode(&snapshot(vec![entry.clone()], LogMetricsMode::default()));
        assert!(!off.iter().any(|l| l.contains("docker_logs_")));

        let counts_only = encode(&snapshot(
            vec![entry.clone()],
            LogMetricsMode {
                enabled: true,
                matches: false,
            },
        ));
        assert!(counts_only.iter().any(|l| l.starts_with("docker_logs_all_count{") && l.ends_with(" 6")));
        assert!(!counts_only.iter().any(|l| l.contains("docker_logs_custom_count")));

        let with_matches = encode(&snapshot(
            vec![entry],
            LogMetricsMode {
                enabled: true,
                matches: true,
            },
        ));
        assert!(with_matches.iter().any(|l| l.starts_with("docker_logs_custom_count{") && l.ends_with(" 3")));
    }

    #[test]
    fn partial_facets_are_flagged() {
        let mut r = full_resources("abc");
        r.partial = vec![Facet::Memory];
        let entry = SnapshotEntry {
            info: info("abc", "web"),
            resources: Some(r),
            logs: None,
            started: None,
        };
        let lines = encode(&snapshot(vec![entry], LogMetricsMode::default()));
        assert!(lines.contains(
            &"docker_stats_partial{containerId=\"abc\",containerName=\"web\",hostname=\"node-1\",facet=\"memory\"} 1"
                .to_string()
        ));
    }

    #[test]
    fn label_values_are_escaped() {
        assert_eq!(escape_label("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }

    #[test]
    fn render_terminates_every_line() {
        let body = render(&snapshot(vec![], LogMetricsMode::default()));
        assert!(body.ends_with("1\n\n"));
        assert_eq!(body.lines().count(), 7);
    }
}
