// Decode a one-shot Docker stats document into a ResourceSample.
//
// Each facet is decoded on its own. A missing facet, or one where no field
// could be read, stays `None`; a facet with only some fields readable is
// zero-filled and flagged partial.

use crate::models::{CpuUsage, Facet, IoUsage, MemoryUsage, NetworkUsage, ResourceSample};
use serde::Deserialize;
use serde_json::{Map, Value};

const NANOS_PER_SECOND: f64 = 1e9;

/// How the network facet is derived when the container has several interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkSelection {
    /// Use only the interface whose name sorts first (e.g. `eth0` before `eth1`).
    #[default]
    First,
    /// Sum counters over every interface.
    Sum,
}

/// Reads numeric fields out of one JSON object, remembering whether any had to be
/// defaulted and whether any was actually read.
struct FieldReader<'a> {
    obj: Option<&'a Map<String, Value>>,
    defaulted: bool,
    read: bool,
}

impl<'a> FieldReader<'a> {
    fn new(obj: Option<&'a Map<String, Value>>) -> Self {
        Self {
            defaulted: obj.is_none(),
            read: false,
            obj,
        }
    }

    fn counter(&mut self, key: &str) -> u64 {
        let v = self.obj.and_then(|o| o.get(key)).and_then(as_counter);
        self.track(v)
    }

    fn float(&mut self, key: &str) -> f64 {
        let v = self.obj.and_then(|o| o.get(key)).and_then(as_float);
        self.track(v)
    }

    fn track<T: Default>(&mut self, v: Option<T>) -> T {
        match v {
            Some(v) => {
                self.read = true;
                v
            }
            None => {
                self.defaulted = true;
                T::default()
            }
        }
    }

    /// `None` when nothing was read, else the value and its partial flag.
    fn finish<T>(self, value: T) -> Option<(T, bool)> {
        self.read.then_some((value, self.defaulted))
    }
}

fn as_counter(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| as_float(v).map(|f| f as u64))
}

fn as_float(v: &Value) -> Option<f64> {
    v.as_f64().filter(|f| f.is_finite() && *f >= 0.0)
}

fn object<'a>(doc: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    doc.get(key).and_then(Value::as_object)
}

pub(crate) fn decode_stats(id: &str, doc: &Value, network: NetworkSelection) -> ResourceSample {
    let mut partial = Vec::new();
    let mut mark = |facet: Facet, defaulted: bool| {
        if defaulted {
            partial.push(facet);
        }
    };

    let cpu = object(doc, "cpu_stats")
        .and_then(|cpu_stats| {
            let mut r = FieldReader::new(cpu_stats.get("cpu_usage").and_then(Value::as_object));
            let usage = CpuUsage {
                total_seconds: r.float("total_usage") / NANOS_PER_SECOND,
                user_seconds: r.float("usage_in_usermode") / NANOS_PER_SECOND,
                kernel_seconds: r.float("usage_in_kernelmode") / NANOS_PER_SECOND,
            };
            r.finish(usage)
        })
        .map(|(usage, defaulted)| {
            mark(Facet::Cpu, defaulted);
            usage
        });

    let memory = object(doc, "memory_stats")
        .and_then(|mem| {
            let mut r = FieldReader::new(Some(mem));
            let usage = MemoryUsage {
                limit_bytes: r.counter("limit"),
                usage_bytes: r.counter("usage"),
            };
            r.finish(usage)
        })
        .map(|(usage, defaulted)| {
            mark(Facet::Memory, defaulted);
            usage
        });

    let network = object(doc, "networks")
        .and_then(|ifaces| decode_network(ifaces, network))
        .map(|(usage, defaulted)| {
            mark(Facet::Network, defaulted);
            usage
        });

    let io = object(doc, "blkio_stats")
        .and_then(decode_io)
        .map(|(usage, defaulted)| {
            mark(Facet::Io, defaulted);
            usage
        });

    let pids = object(doc, "pids_stats")
        .and_then(|p| {
            let mut r = FieldReader::new(Some(p));
            let current = r.counter("current");
            r.finish(current)
        })
        .map(|(current, defaulted)| {
            mark(Facet::Pids, defaulted);
            current
        });

    ResourceSample {
        id: id.to_string(),
        cpu,
        memory,
        network,
        io,
        pids,
        partial,
    }
}

fn read_interface(iface: &Value) -> Option<(NetworkUsage, bool)> {
    let mut r = FieldReader::new(iface.as_object());
    let usage = NetworkUsage {
        rx_bytes: r.counter("rx_bytes"),
        rx_packets: r.counter("rx_packets"),
        tx_bytes: r.counter("tx_bytes"),
        tx_packets: r.counter("tx_packets"),
    };
    r.finish(usage)
}

fn decode_network(
    ifaces: &Map<String, Value>,
    selection: NetworkSelection,
) -> Option<(NetworkUsage, bool)> {
    match selection {
        NetworkSelection::First => ifaces
            .keys()
            .min()
            .and_then(|name| ifaces.get(name))
            .and_then(read_interface),
        NetworkSelection::Sum => {
            let mut total: Option<NetworkUsage> = None;
            let mut defaulted = false;
            for iface in ifaces.values() {
                let Some((u, d)) = read_interface(iface) else {
                    defaulted = true;
                    continue;
                };
                let t = total.get_or_insert_with(NetworkUsage::default);
                t.rx_bytes = t.rx_bytes.saturating_add(u.rx_bytes);
                t.rx_packets = t.rx_packets.saturating_add(u.rx_packets);
                t.tx_bytes = t.tx_bytes.saturating_add(u.tx_bytes);
                t.tx_packets = t.tx_packets.saturating_add(u.tx_packets);
                defaulted |= d;
            }
            total.map(|t| (t, defaulted))
        }
    }
}

/// Sums `read` entries into read bytes; every other op (write, sync, async, total...)
/// is folded into write bytes. `None` when the list is malformed or no entry is readable.
fn decode_io(blkio: &Map<String, Value>) -> Option<(IoUsage, bool)> {
    let mut usage = IoUsage::default();
    let entries = match blkio.get("io_service_bytes_recursive") {
        // The daemon reports null until the container has done any block I/O.
        None | Some(Value::Null) => return Some((usage, false)),
        Some(Value::Array(entries)) => entries,
        Some(_) => return None,
    };
    let mut defaulted = false;
    let mut read_any = entries.is_empty();
    for entry in entries {
        let op = entry.get("op").and_then(Value::as_str);
        let value = entry.get("value").and_then(as_counter);
        match (op, value) {
            (Some(op), Some(value)) if op.eq_ignore_ascii_case("read") => {
                usage.read_bytes = usage.read_bytes.saturating_add(value);
                read_any = true;
            }
            (Some(_), Some(value)) => {
                usage.write_bytes = usage.write_bytes.saturating_add(value);
                read_any = true;
            }
            _ => defaulted = true,
        }
    }
    read_any.then_some((usage, defaulted))
}
