use crate::config::settings::{LogFormat, LoggingConfig};
use crate::config::types::ServiceConfig;
use crate::utils::constants::DEFAULT_LOG_LEVEL;

pub fn initiate_default_values(mut config: ServiceConfig) -> ServiceConfig {
    if config.settings.logging.is_none() {
        config.settings.logging = Some(LoggingConfig::new(DEFAULT_LOG_LEVEL.to_owned(), LogFormat::Compact));
    }

    // tolerate "http://host/" as well as "http://host"
    if let Some(base) = config.settings.probe.endpoint_override.as_mut() {
        let trimmed = base.trim().trim_end_matches('/').to_owned();
        *base = trimmed;
    }

    config
}
