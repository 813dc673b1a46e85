use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{env, fs};

use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub connection: ConnectionConfig,
}

/// ================================
/// Broker connection
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionConfig {
    /// Event Hubs connection string, `Endpoint=sb://...;EntityPath=...`
    pub secret: SecretValue,
}

/// Where the connection string comes from
#[derive(Deserialize, Clone)]
#[serde(untagged)]
pub enum SecretValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretValue::Literal { .. } => f.write_str("Literal { value: <redacted> }"),
            SecretValue::FromEnv { from_env } => f.debug_struct("FromEnv").field("from_env", from_env).finish(),
            SecretValue::FromFile { path } => f.debug_struct("FromFile").field("path", path).finish(),
        }
    }
}

impl SecretValue {
    /// Read the secret from its source. File content is trimmed.
    pub fn resolve(&self) -> Result<String> {
        match self {
            SecretValue::Literal { value } => Ok(value.to_owned()),
            SecretValue::FromEnv { from_env } => {
                env::var(from_env).map_err(|err| anyhow!("secret env '{}': {}", from_env, err))
            }
            SecretValue::FromFile { path } => fs::read_to_string(path)
                .with_context(|| format!("secret file '{}'", path))
                .map(|res| res.trim().to_string()),
        }
    }
}
