//! Shared constants and invariants

pub const DEFAULT_CONFIG_PATH: &str = "hub-canary.yaml";

pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 1000;
/// Matches the `timeout=60` the broker is asked to honour.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 60_000;

pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_METRICS_HOST: &str = "0.0.0.0";
pub const DEFAULT_METRICS_PORT: &str = "9100";

pub const DEFAULT_LOG_LEVEL: &str = "info";
