//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the health
//! service. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recommended budget for one check pass.
pub const DEFAULT_CHECK_TIMEOUT_MS: u64 = 10_000;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Aggregate check settings.
    pub health: HealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Probes to register.
    pub probes: Vec<ProbeConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Aggregate health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthConfig {
    /// Path serving the aggregate (liveness lives at `{path}/live`).
    pub path: String,

    /// Budget for one check pass in milliseconds.
    pub timeout_ms: u64,

    /// Version string reported in responses.
    pub version: String,
}

impl HealthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn live_path(&self) -> String {
        format!("{}/live", self.path.trim_end_matches('/'))
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            path: "/health".to_string(),
            timeout_ms: DEFAULT_CHECK_TIMEOUT_MS,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format ("text" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Kind of probe declared in configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// TCP connect to `address`.
    #[default]
    Tcp,
}

/// One configured probe.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProbeConfig {
    /// Unique probe name (key in the response's `checks`).
    pub name: String,

    #[serde(default)]
    pub kind: ProbeKind,

    /// Target `host:port`.
    pub address: String,

    /// Per-probe cap in milliseconds (bounded by the pass budget).
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Report degraded when the probe takes at least this long.
    #[serde(default)]
    pub degraded_after_ms: Option<u64>,
}
