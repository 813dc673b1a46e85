use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::helpers::time::now_utc;
use crate::observability::metrics::get_metrics;
use crate::publisher::error::PublishError;
use crate::token::{
    derive_endpoint, endpoint_for_base, issue_credential, parse_connection_descriptor, ConnectionDescriptor,
    Credential, TokenError,
};

pub const BROKER_PROPERTIES_HEADER: &str = "BrokerProperties";

/// Sends one message per call.
pub trait Publish {
    fn send(
        &self,
        payload: &[u8],
        partition_key: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), PublishError>> + Send;
}

/// Where the publish endpoint is rooted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointOrigin {
    /// `https://<namespace>.servicebus.windows.net`
    Namespace,
    /// Explicit base URL, e.g. a local emulator.
    Base(String),
}

/// HTTP publisher holding a cached SAS credential.
///
/// The credential is issued on construction and swapped for a freshly derived
/// one after every failed send. A successful send leaves it untouched.
#[derive(Debug)]
pub struct Publisher {
    client: Client,
    descriptor: ConnectionDescriptor,
    origin: EndpointOrigin,
    credential: RwLock<Arc<Credential>>,
}

impl Publisher {
    pub fn new(client: Client, descriptor: ConnectionDescriptor) -> Self {
        Self::with_origin(client, descriptor, EndpointOrigin::Namespace)
    }

    pub fn with_origin(client: Client, descriptor: ConnectionDescriptor, origin: EndpointOrigin) -> Self {
        let credential = derive_credential(&descriptor, &origin);
        get_metrics().credential_expiry_unix.set(credential.expires_at().timestamp());
        info!(endpoint = %credential.endpoint, expires_at = %credential.expires_at(), "credential issued");
        Self {
            client,
            descriptor,
            origin,
            credential: RwLock::new(Arc::new(credential)),
        }
    }

    pub fn from_secret(client: Client, secret: &str, origin: EndpointOrigin) -> Result<Self, TokenError> {
        let descriptor = parse_connection_descriptor(secret)?;
        Ok(Self::with_origin(client, descriptor, origin))
    }

    /// Currently cached credential.
    pub async fn credential(&self) -> Arc<Credential> {
        self.credential.read().await.clone()
    }

    /// Re-derive endpoint and token from the descriptor and replace the cached pair.
    async fn refresh(&self) {
        let fresh = Arc::new(derive_credential(&self.descriptor, &self.origin));
        let metrics = get_metrics();
        metrics.credential_refreshes.inc();
        metrics.credential_expiry_unix.set(fresh.expires_at().timestamp());
        debug!(endpoint = %fresh.endpoint, expires_at = %fresh.expires_at(), "credential refreshed");

        *self.credential.write().await = fresh;
    }

    async fn post(&self, credential: &Credential, payload: &[u8], partition_key: Option<&str>) -> Result<(), PublishError> {
        let mut request = self
            .client
            .post(&credential.endpoint)
            .header(AUTHORIZATION, &credential.token);

        if let Some(key) = partition_key.filter(|k| !k.is_empty()) {
            request = request.header(BROKER_PROPERTIES_HEADER, broker_properties(key));
        }

        let response = request.body(payload.to_vec()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|err| format!("<unreadable body: {}>", err));
            return Err(PublishError::Rejected { status, body });
        }
        Ok(())
    }
}

impl Publish for Publisher {
    async fn send(&self, payload: &[u8], partition_key: Option<&str>) -> Result<(), PublishError> {
        let credential = self.credential().await;
        let result = self.post(&credential, payload, partition_key).await;
        if result.is_err() {
            self.refresh().await;
        }
        result
    }
}

impl<P: Publish + Send + Sync> Publish for Arc<P> {
    fn send(
        &self,
        payload: &[u8],
        partition_key: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), PublishError>> + Send {
        (**self).send(payload, partition_key)
    }
}

/// `{"PartitionKey":"<key>"}`
pub fn broker_properties(partition_key: &str) -> String {
    json!({ "PartitionKey": partition_key }).to_string()
}

fn derive_credential(descriptor: &ConnectionDescriptor, origin: &EndpointOrigin) -> Credential {
    let endpoint = match origin {
        EndpointOrigin::Namespace => derive_endpoint(descriptor),
        EndpointOrigin::Base(base_url) => endpoint_for_base(base_url, &descriptor.entity_path),
    };
    issue_credential(descriptor, endpoint, now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "Endpoint=sb://ns.servicebus.windows.net/;SharedAccessKeyName=pol;SharedAccessKey=abc123;EntityPath=hub";

    #[test]
    fn broker_properties_is_exact_json() {
        assert_eq!(broker_properties("50"), r#"{"PartitionKey":"50"}"#);
        assert_eq!(broker_properties("a\"b"), r#"{"PartitionKey":"a\"b"}"#);
    }

    #[test]
    fn namespace_origin_targets_servicebus_host() {
        let publisher = Publisher::from_secret(Client::new(), SECRET, EndpointOrigin::Namespace).unwrap();
        let credential = publisher.credential.try_read().unwrap().clone();
        assert_eq!(
            credential.endpoint,
            "https://ns.servicebus.windows.net/hub/messages?timeout=60&api-version=2014-01"
        );
        assert!(credential.token.starts_with("SharedAccessSignature sr=https%3A%2F%2Fns.servicebus"));
        assert!(credential.token.ends_with("&skn=pol"));
    }

    #[test]
    fn construction_records_credential_expiry() {
        let publisher = Publisher::from_secret(Client::new(), SECRET, EndpointOrigin::Namespace).unwrap();
        let expires_at = publisher.credential.try_read().unwrap().expires_at().timestamp();

        // other tests share the registry, so compare against a window rather than one value
        let recorded = get_metrics().credential_expiry_unix.get();
        assert!(recorded > 0);
        assert!((recorded - expires_at).abs() < 60, "recorded {} expected ~{}", recorded, expires_at);
    }

    #[test]
    fn malformed_secret_fails_construction() {
        let err = Publisher::from_secret(Client::new(), "Endpoint=sb://ns.servicebus.windows.net/", EndpointOrigin::Namespace)
            .unwrap_err();
        assert!(matches!(err, TokenError::MalformedSecret(_)));
    }
}
