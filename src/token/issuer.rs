use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::token::credential::Credential;
use crate::token::descriptor::ConnectionDescriptor;

/// Lifetime of every issued SAS token: 7 days.
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

pub const BROKER_HOST_SUFFIX: &str = "servicebus.windows.net";
pub const SEND_TIMEOUT_SECONDS: u32 = 60;
pub const API_VERSION: &str = "2014-01";

const SAS_PREFIX: &str = "SharedAccessSignature";

type HmacSha256 = Hmac<Sha256>;

/// `https://<ns>.servicebus.windows.net/<entity>/messages?timeout=60&api-version=2014-01`
pub fn derive_endpoint(descriptor: &ConnectionDescriptor) -> String {
    let base = format!("https://{}.{}", descriptor.namespace_host, BROKER_HOST_SUFFIX);
    endpoint_for_base(&base, &descriptor.entity_path)
}

/// Same path and query as [`derive_endpoint`], rooted at an explicit base URL.
pub fn endpoint_for_base(base_url: &str, entity_path: &str) -> String {
    format!(
        "{}/{}/messages?timeout={}&api-version={}",
        base_url.trim_end_matches('/'),
        entity_path,
        SEND_TIMEOUT_SECONDS,
        API_VERSION
    )
}

/// Build a SAS token for `endpoint` that expires [`TOKEN_TTL_SECONDS`] after `now`.
/// Pure: the same inputs always give the same token.
pub fn issue_token(descriptor: &ConnectionDescriptor, endpoint: &str, now: DateTime<Utc>) -> String {
    let expiry = now.timestamp() + TOKEN_TTL_SECONDS;
    let resource = urlencoding::encode(endpoint);
    let string_to_sign = format!("{}\n{}", resource, expiry);

    let mut mac = HmacSha256::new_from_slice(descriptor.access_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(string_to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    format!(
        "{} sr={}&sig={}&se={}&skn={}",
        SAS_PREFIX,
        resource,
        urlencoding::encode(&signature),
        expiry,
        descriptor.policy_name
    )
}

/// Derive a whole credential for `endpoint` at `now`.
pub fn issue_credential(descriptor: &ConnectionDescriptor, endpoint: String, now: DateTime<Utc>) -> Credential {
    let token = issue_token(descriptor, &endpoint, now);
    Credential::new(endpoint, token, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::descriptor::parse_connection_descriptor;

    const SECRET: &str = "Endpoint=sb://ns.servicebus.windows.net/;SharedAccessKeyName=pol;SharedAccessKey=abc123;EntityPath=hub";
    const ENDPOINT: &str = "https://ns.servicebus.windows.net/hub/messages?timeout=60&api-version=2014-01";

    fn descriptor() -> ConnectionDescriptor {
        parse_connection_descriptor(SECRET).unwrap()
    }

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    fn expiry_of(token: &str) -> i64 {
        token
            .split('&')
            .find_map(|part| part.strip_prefix("se="))
            .unwrap()
            .parse()
            .unwrap()
    }

    #[test]
    fn derives_endpoint_from_descriptor() {
        assert_eq!(derive_endpoint(&descriptor()), ENDPOINT);
    }

    #[test]
    fn endpoint_for_base_ignores_trailing_slash() {
        assert_eq!(
            endpoint_for_base("http://127.0.0.1:8080/", "hub"),
            "http://127.0.0.1:8080/hub/messages?timeout=60&api-version=2014-01"
        );
    }

    #[test]
    fn token_matches_known_signature() {
        let token = issue_token(&descriptor(), ENDPOINT, at(1_700_000_000));
        assert_eq!(
            token,
            "SharedAccessSignature \
             sr=https%3A%2F%2Fns.servicebus.windows.net%2Fhub%2Fmessages%3Ftimeout%3D60%26api-version%3D2014-01\
             &sig=wWhTvsVWWBkGRNdYKViIfZ3%2FETAl%2F4i35BZrbWE%2BcbM%3D\
             &se=1700604800\
             &skn=pol"
        );
    }

    #[test]
    fn token_is_deterministic() {
        let now = at(1_650_000_123);
        assert_eq!(
            issue_token(&descriptor(), ENDPOINT, now),
            issue_token(&descriptor(), ENDPOINT, now)
        );
    }

    #[test]
    fn expiry_is_seven_days_after_now() {
        for ts in [0, 1_000, 1_700_000_000, 2_000_000_001] {
            let token = issue_token(&descriptor(), ENDPOINT, at(ts));
            assert_eq!(expiry_of(&token), ts + 604_800);
        }
    }

    #[test]
    fn sub_second_precision_is_truncated() {
        let now = DateTime::from_timestamp(1_700_000_000, 999_000_000).unwrap();
        assert_eq!(expiry_of(&issue_token(&descriptor(), ENDPOINT, now)), 1_700_604_800);
    }

    #[test]
    fn different_keys_sign_differently() {
        let mut other = descriptor();
        other.access_key = "another".to_owned();
        let now = at(1_700_000_000);
        assert_ne!(issue_token(&descriptor(), ENDPOINT, now), issue_token(&other, ENDPOINT, now));
    }

    #[test]
    fn credential_carries_endpoint_token_and_issue_time() {
        let now = at(1_700_000_000);
        let credential = issue_credential(&descriptor(), ENDPOINT.to_owned(), now);
        assert_eq!(credential.endpoint, ENDPOINT);
        assert_eq!(credential.issued_at, now);
        assert_eq!(credential.token, issue_token(&descriptor(), ENDPOINT, now));
        assert_eq!(credential.expires_at(), at(1_700_604_800));
    }
}
