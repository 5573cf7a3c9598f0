use crate::docker_repo::NetworkSelection;
use regex::Regex;
use serde::Deserialize;

/// Matches quoted error-level tokens, e.g. `"level":"error"`.
pub const DEFAULT_LOG_CUSTOM_QUERY: &str = r#""(err|error|ERR|ERROR)""#;

pub const ENV_LOG_METRICS: &str = "DOCKER_LOG_METRICS";
pub const ENV_LOG_CUSTOM_METRICS: &str = "DOCKER_LOG_CUSTOM_METRICS";
pub const ENV_LOG_CUSTOM_QUERY: &str = "DOCKER_LOG_CUSTOM_QUERY";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    9333
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    /// List stopped containers too, so the stopped-count gauge is populated.
    #[serde(default = "default_include_stopped")]
    pub include_stopped: bool,
    /// Upper bound on in-flight runtime queries within one stage.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Deadline for a single per-container query.
    #[serde(default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,
    #[serde(default)]
    pub network_interfaces: NetworkSelection,
    /// Query inspect data for the start-time family.
    #[serde(default = "default_start_time")]
    pub start_time: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            include_stopped: default_include_stopped(),
            max_concurrency: default_max_concurrency(),
            task_timeout_ms: default_task_timeout_ms(),
            network_interfaces: NetworkSelection::default(),
            start_time: default_start_time(),
        }
    }
}

fn default_include_stopped() -> bool {
    true
}

fn default_start_time() -> bool {
    true
}

fn default_max_concurrency() -> usize {
    32
}

fn default_task_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    /// Emit line-count families for stdout/stderr.
    #[serde(default)]
    pub enabled: bool,
    /// Also count lines matching `custom_query`.
    #[serde(default)]
    pub custom_enabled: bool,
    #[serde(default = "default_custom_query")]
    pub custom_query: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            custom_enabled: false,
            custom_query: default_custom_query(),
        }
    }
}

fn default_custom_query() -> String {
    DEFAULT_LOG_CUSTOM_QUERY.into()
}

impl AppConfig {
    /// Reads `CONFIG_FILE` if set (defaults otherwise), then applies the
    /// `DOCKER_LOG_*` environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let s = match std::env::var("CONFIG_FILE") {
            Ok(path) => std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?,
            Err(_) => String::new(),
        };
        let mut config: AppConfig = toml::from_str(&s)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests). No environment overrides.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_LOG_METRICS) {
            self.logs.enabled = is_true(&v);
        }
        if let Some(v) = lookup(ENV_LOG_CUSTOM_METRICS) {
            self.logs.custom_enabled = is_true(&v);
        }
        if let Some(v) = lookup(ENV_LOG_CUSTOM_QUERY).filter(|v| !v.is_empty()) {
            self.logs.custom_query = v;
        }
    }

    /// Compiled custom log pattern, or `None` when custom counting is off.
    pub fn log_pattern(&self) -> anyhow::Result<Option<Regex>> {
        if !self.logs.custom_enabled {
            return Ok(None);
        }
        let re = Regex::new(&self.logs.custom_query).map_err(|e| {
            anyhow::anyhow!(
                "logs.custom_query is not a valid regular expression: {}",
                e
            )
        })?;
        Ok(Some(re))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.collection.max_concurrency > 0,
            "collection.max_concurrency must be > 0, got {}",
            self.collection.max_concurrency
        );
        anyhow::ensure!(
            self.collection.task_timeout_ms > 0,
            "collection.task_timeout_ms must be > 0, got {}",
            self.collection.task_timeout_ms
        );
        self.log_pattern()?;
        Ok(())
    }
}

fn is_true(v: &str) -> bool {
    v.trim().eq_ignore_ascii_case("true")
}
