use std::{fs, path::Path};
use crate::config::proc_initiateor::initiate_default_values;
use crate::config::types::ServiceConfig;
use anyhow::{anyhow, Result};
use regex::{Captures, Regex};
use tracing::{debug, error};
use crate::config::proc_validator;

/// Load and validate config from YAML file
pub fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded)
}

pub fn parse_config(content: String) -> Result<ServiceConfig> {
    let service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
        })?;

    let service_config = initiate_default_values(service_config);
    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config).map_err(|errors| {
        anyhow!(
            "config is not valid, total errors: {}\n{}",
            errors.len(),
            errors.join("\n")
        )
    })?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with the environment value, or the
/// default (empty when absent) if the variable is unset.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const MINIMAL: &str = r#"
connection:
  secret:
    value: "Endpoint=sb://ns.servicebus.windows.net/;SharedAccessKeyName=pol;SharedAccessKey=abc123;EntityPath=hub"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = parse_config(MINIMAL.to_owned()).unwrap();
        assert_eq!(cfg.settings.probe.interval_ms, 1000);
        assert_eq!(cfg.settings.probe.http_timeout_ms, 60_000);
        assert!(cfg.settings.probe.endpoint_override.is_none());
        assert!(!cfg.settings.metrics.is_enabled);
        assert_eq!(cfg.settings.metrics.path, "/metrics");
        let logging = cfg.settings.logging.unwrap();
        assert_eq!(logging.level, "info");
    }

    #[test]
    fn full_config_is_read() {
        let yaml = r#"
settings:
  probe:
    interval_ms: 250
    http_timeout_ms: 2000
    endpoint_override: "http://127.0.0.1:8080"
  logging:
    level: debug
    format: json
  metrics:
    is_enabled: true
    path: /prom
  server:
    host: 127.0.0.1
    port: "9200"
connection:
  secret:
    from_env: EVENTHUB_CONNECTION_STRING
"#;
        let cfg = parse_config(yaml.to_owned()).unwrap();
        assert_eq!(cfg.settings.probe.interval_ms, 250);
        assert_eq!(cfg.settings.probe.endpoint_override.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(cfg.settings.metrics.is_enabled);
        assert_eq!(cfg.settings.server.port, "9200");
    }

    #[test]
    fn invalid_values_are_aggregated() {
        let yaml = r#"
settings:
  probe:
    interval_ms: 0
    http_timeout_ms: 0
  metrics:
    path: metrics
connection:
  secret:
    value: ""
"#;
        let err = parse_config(yaml.to_owned()).unwrap_err().to_string();
        assert!(err.contains("total errors: 4"), "{}", err);
        assert!(err.contains("settings.probe.interval_ms"));
        assert!(err.contains("settings.metrics.path"));
    }

    #[test]
    fn missing_connection_is_rejected() {
        assert!(parse_config("settings: {}".to_owned()).is_err());
    }

    #[test]
    #[serial]
    fn env_vars_are_expanded_with_defaults() {
        std::env::set_var("HUB_CANARY_TEST_INTERVAL", "500");
        std::env::remove_var("HUB_CANARY_TEST_UNSET");
        let expanded =
            expand_env_vars("a: ${HUB_CANARY_TEST_INTERVAL}\nb: ${HUB_CANARY_TEST_UNSET:fallback}\nc: ${HUB_CANARY_TEST_UNSET}").unwrap();
        assert_eq!(expanded, "a: 500\nb: fallback\nc: ");
        std::env::remove_var("HUB_CANARY_TEST_INTERVAL");
    }

    #[test]
    #[serial]
    fn loads_from_file() {
        std::env::set_var("HUB_CANARY_TEST_PORT", "9300");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}settings:\n  server:\n    port: \"${{HUB_CANARY_TEST_PORT}}\"\n", MINIMAL).unwrap();

        let cfg = file_to_config(file.path()).unwrap();
        assert_eq!(cfg.settings.server.port, "9300");
        std::env::remove_var("HUB_CANARY_TEST_PORT");
    }
}
