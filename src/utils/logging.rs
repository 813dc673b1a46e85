
use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use crate::ServiceConfig;
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::utils::constants::DEFAULT_LOG_LEVEL;


#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::TRACE => "trace",
            LogLevel::DEBUG => "debug",
            LogLevel::INFO => "info",
            LogLevel::WARN => "warn",
            LogLevel::ERROR => "error",
        }
    }
}


/// CLI level wins over the config file level.
pub fn resolve_logging_config(service_config: &ServiceConfig, arg_log_level: Option<LogLevel>) -> LoggingConfig {
    let (level, format) = match &service_config.settings.logging {
        Some(config) => (config.level.to_owned(), config.format.to_owned()),
        None => (DEFAULT_LOG_LEVEL.to_owned(), LogFormat::Compact),
    };
    let level = arg_log_level.map(|l| l.as_str().to_owned()).unwrap_or(level);
    LoggingConfig::new(level, format)
}

pub fn run(service_config: &ServiceConfig, arg_log_level: Option<LogLevel>) {
    init_logging(&resolve_logging_config(service_config, arg_log_level));
}


/// Initialize tracing with the desired config.
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&cfg.level)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    // Base layer: filter + writer
    let registry = tracing_subscriber::registry().with(env_filter);

    // Choose format layer
    match cfg.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .flatten_event(true) // flattens fields, good for CRI log parsers
                .with_ansi(false); // CRI parsers dislike ANSI color codes

            let _ = registry.with(layer).try_init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(true);

            let _ = registry.with(layer).try_init();
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::proc_loader::parse_config;

    const CONFIG: &str = r#"
settings:
  logging:
    level: warn
    format: json
connection:
  secret:
    from_env: EVENTHUB_CONNECTION_STRING
"#;

    #[test]
    fn config_level_is_used_without_cli_override() {
        let cfg = parse_config(CONFIG.to_owned()).unwrap();
        let logging = resolve_logging_config(&cfg, None);
        assert_eq!(logging.level, "warn");
        assert_eq!(logging.format, LogFormat::Json);
    }

    #[test]
    fn cli_level_overrides_config() {
        let cfg = parse_config(CONFIG.to_owned()).unwrap();
        let logging = resolve_logging_config(&cfg, Some(LogLevel::DEBUG));
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
    }
}
