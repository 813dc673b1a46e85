use std::fmt;

use crate::token::error::TokenError;

const ENDPOINT_KEY: &str = "Endpoint";
const ENTITY_PATH_KEY: &str = "EntityPath";
const POLICY_NAME_KEY: &str = "SharedAccessKeyName";
const ACCESS_KEY_KEY: &str = "SharedAccessKey";

const ENDPOINT_SCHEME: &str = "sb://";
const ENDPOINT_HOST_MARKER: &str = ".servicebus";

/// Parsed connection string. Built once at start-up and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub namespace_host: String,
    pub entity_path: String,
    pub policy_name: String,
    pub access_key: String,
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("namespace_host", &self.namespace_host)
            .field("entity_path", &self.entity_path)
            .field("policy_name", &self.policy_name)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Parse `Endpoint=sb://<ns>.servicebus.windows.net/;SharedAccessKeyName=..;SharedAccessKey=..;EntityPath=..`.
///
/// Segment order is not significant. Each segment is split on its first `=`
/// only, since access keys are base64 and may end with padding.
pub fn parse_connection_descriptor(secret: &str) -> Result<ConnectionDescriptor, TokenError> {
    let mut endpoint = None;
    let mut entity_path = None;
    let mut policy_name = None;
    let mut access_key = None;

    for segment in secret.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            ENDPOINT_KEY => endpoint = Some(value),
            ENTITY_PATH_KEY => entity_path = Some(value),
            POLICY_NAME_KEY => policy_name = Some(value),
            ACCESS_KEY_KEY => access_key = Some(value),
            _ => {}
        }
    }

    let endpoint = required(ENDPOINT_KEY, endpoint)?;
    Ok(ConnectionDescriptor {
        namespace_host: namespace_host(endpoint)?,
        entity_path: required(ENTITY_PATH_KEY, entity_path)?.to_owned(),
        policy_name: required(POLICY_NAME_KEY, policy_name)?.to_owned(),
        access_key: required(ACCESS_KEY_KEY, access_key)?.to_owned(),
    })
}

fn required<'a>(key: &str, value: Option<&'a str>) -> Result<&'a str, TokenError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(TokenError::MalformedSecret(format!("{} is empty", key))),
        None => Err(TokenError::MalformedSecret(format!("{} is missing", key))),
    }
}

fn namespace_host(endpoint: &str) -> Result<String, TokenError> {
    let host = endpoint
        .strip_prefix(ENDPOINT_SCHEME)
        .and_then(|rest| rest.rfind(ENDPOINT_HOST_MARKER).map(|idx| &rest[..idx]))
        .ok_or_else(|| {
            TokenError::MalformedSecret(format!(
                "{} must look like {}<namespace>{}...",
                ENDPOINT_KEY, ENDPOINT_SCHEME, ENDPOINT_HOST_MARKER
            ))
        })?;

    required("Endpoint namespace", Some(host)).map(str::to_owned)
}
