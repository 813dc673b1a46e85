use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_METRICS_HOST, DEFAULT_METRICS_PATH, DEFAULT_METRICS_PORT, DEFAULT_PROBE_INTERVAL_MS,
};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub probe: ProbeConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    /// target cadence between two publish attempts
    /// invariant: > 0
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// per-request client timeout
    /// invariant: > 0
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
    /// base url used instead of https://<namespace>.servicebus.windows.net
    pub endpoint_override: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            http_timeout_ms: default_http_timeout_ms(),
            endpoint_override: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { path: default_metrics_path(), is_enabled: false }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: String
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_server_host(), port: default_server_port() }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_interval_ms() -> u64 {
    DEFAULT_PROBE_INTERVAL_MS
}

fn default_http_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_metrics_path() -> String {
    DEFAULT_METRICS_PATH.to_string()
}

fn default_server_host() -> String {
    DEFAULT_METRICS_HOST.to_string()
}

fn default_server_port() -> String {
    DEFAULT_METRICS_PORT.to_string()
}
