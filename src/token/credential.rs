use chrono::{DateTime, Duration, Utc};

use crate::token::issuer::TOKEN_TTL_SECONDS;

/// Endpoint plus the SAS token signed for it.
/// Replaced as a whole on refresh, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub endpoint: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl Credential {
    pub(crate) fn new(endpoint: String, token: String, issued_at: DateTime<Utc>) -> Self {
        Self { endpoint, token, issued_at }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(TOKEN_TTL_SECONDS)
    }
}
