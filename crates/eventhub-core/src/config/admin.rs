//! Admin instrumentation configuration.

use serde::{Deserialize, Serialize};

/// Operating mode of the instrumentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Full observation and control: per-event notifications, socket
    /// snapshots, and admin-issued commands.
    Development,
    /// Restricted mode: only aggregated counters are exposed.
    Production,
}

/// Admin instrumentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Namespace reserved for admin monitoring traffic.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// When set, admin-issued control commands are disabled.
    #[serde(default)]
    pub read_only: bool,
    /// Operating mode.
    #[serde(default = "default_mode")]
    pub mode: OperatingMode,
    /// Seconds between `server_stats` publications.
    #[serde(default = "default_stats_interval")]
    pub server_stats_interval_seconds: u64,
    /// Identity reported in stats messages.
    #[serde(default)]
    pub identity: ServerIdentity,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            read_only: false,
            mode: default_mode(),
            server_stats_interval_seconds: default_stats_interval(),
            identity: ServerIdentity::default(),
        }
    }
}

/// Identity of the instrumented server instance.
///
/// Hostname and pid are instance configuration, detected once at
/// construction, rather than process-wide globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerIdentity {
    /// Stable identifier reported as `serverId`; defaults to the hostname.
    #[serde(default)]
    pub server_id: Option<String>,
    /// Host name reported in stats.
    #[serde(default = "detect_hostname")]
    pub hostname: String,
    /// Process id reported in stats.
    #[serde(default = "detect_pid")]
    pub pid: u32,
}

impl ServerIdentity {
    /// Detect identity from the current process, with an optional explicit
    /// server id.
    pub fn detect(server_id: Option<String>) -> Self {
        Self {
            server_id,
            hostname: detect_hostname(),
            pid: detect_pid(),
        }
    }

    /// The effective server id: the configured one, or the hostname.
    pub fn effective_server_id(&self) -> &str {
        self.server_id.as_deref().unwrap_or(&self.hostname)
    }
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self::detect(None)
    }
}

fn default_namespace() -> String {
    "/admin".to_string()
}

fn default_mode() -> OperatingMode {
    OperatingMode::Development
}

fn default_stats_interval() -> u64 {
    2
}

fn detect_hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

fn detect_pid() -> u32 {
    std::process::id()
}
