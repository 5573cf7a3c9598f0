// Per-container measurements produced by the collector stages

/// A group of related resource fields that is decoded (and emitted) as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Cpu,
    Memory,
    Network,
    Io,
    Pids,
    Logs,
}

impl Facet {
    pub fn as_str(self) -> &'static str {
        match self {
            Facet::Cpu => "cpu",
            Facet::Memory => "memory",
            Facet::Network => "network",
            Facet::Io => "io",
            Facet::Pids => "pids",
            Facet::Logs => "logs",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuUsage {
    pub total_seconds: f64,
    pub user_seconds: f64,
    pub kernel_seconds: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    pub limit_bytes: u64,
    pub usage_bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkUsage {
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoUsage {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// One-shot resource measurement for a container.
///
/// A facet is `None` when the stats document did not contain it at all; the
/// encoder then omits its metric families. A facet listed in `partial` was
/// present but had at least one field defaulted to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSample {
    pub id: String,
    pub cpu: Option<CpuUsage>,
    pub memory: Option<MemoryUsage>,
    pub network: Option<NetworkUsage>,
    pub io: Option<IoUsage>,
    pub pids: Option<u64>,
    pub partial: Vec<Facet>,
}

impl ResourceSample {
    pub fn is_partial(&self, facet: Facet) -> bool {
        self.partial.contains(&facet)
    }
}

/// Line and pattern-match counts for one log stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamCount {
    pub lines: u64,
    pub matches: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSample {
    pub id: String,
    pub stdout_lines: u64,
    pub stderr_lines: u64,
    pub total_lines: u64,
    pub stdout_matches: u64,
    pub stderr_matches: u64,
    pub total_matches: u64,
    /// Only one of the two streams could be read.
    pub partial: bool,
}

impl LogSample {
    /// Joins the two stream results for one container. Returns `None` when
    /// neither stream could be read.
    pub fn from_streams(
        id: impl Into<String>,
        stdout: Option<StreamCount>,
        stderr: Option<StreamCount>,
    ) -> Option<Self> {
        if stdout.is_none() && stderr.is_none() {
            return None;
        }
        let partial = stdout.is_none() || stderr.is_none();
        let out = stdout.unwrap_or_default();
        let err = stderr.unwrap_or_default();
        Some(Self {
            id: id.into(),
            stdout_lines: out.lines,
            stderr_lines: err.lines,
            total_lines: out.lines + err.lines,
            stdout_matches: out.matches,
            stderr_matches: err.matches,
            total_matches: out.matches + err.matches,
            partial,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartSample {
    pub id: String,
    pub started_at_unix_seconds: f64,
}
