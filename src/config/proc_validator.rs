//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates probe cadence/timeout, endpoint override, logging, metrics and
//!   the connection secret source.

use reqwest::Url;
use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::types::{SecretValue, ServiceConfig};

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_secret_value("connection.secret", &cfg.connection.secret, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    let probe = &settings.probe;
    if probe.interval_ms == 0 {
        errors.push("settings.probe.interval_ms must be > 0".to_string());
    }
    if probe.http_timeout_ms == 0 {
        errors.push("settings.probe.http_timeout_ms must be > 0".to_string());
    }
    if let Some(base) = &probe.endpoint_override {
        match Url::parse(base) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(format!(
                "settings.probe.endpoint_override '{}' has unsupported scheme '{}'",
                base,
                url.scheme()
            )),
            Err(err) => errors.push(format!(
                "settings.probe.endpoint_override '{}' is not a valid url: {}",
                base, err
            )),
        }
    }

    if settings.server.host.is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    // logging level
    if let Some(logging) = &settings.logging {
        if !VALID_LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, VALID_LOG_LEVELS
            ));
        }
    }
}

fn validate_secret_value(path: &str, v: &SecretValue, errors: &mut Vec<String>) {
    match v {
        SecretValue::Literal { value } => {
            if value.trim().is_empty() {
                errors.push(format!("{}: literal value cannot be empty", path));
            }
        }
        SecretValue::FromEnv { from_env } => {
            if from_env.trim().is_empty() {
                errors.push(format!("{}: env name cannot be empty", path));
            }
        }
        SecretValue::FromFile { path: p } => {
            if p.trim().is_empty() {
                errors.push(format!("{}: path cannot be empty", path));
            }
            // existence is checked when the secret is resolved at start-up
        }
    }
}
