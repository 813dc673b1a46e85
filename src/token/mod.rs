//! SAS credential derivation: connection secret parsing, endpoint and token issuing.

pub mod credential;
pub mod descriptor;
pub mod error;
pub mod issuer;

pub use credential::Credential;
pub use descriptor::{parse_connection_descriptor, ConnectionDescriptor};
pub use error::TokenError;
pub use issuer::{derive_endpoint, endpoint_for_base, issue_credential, issue_token};
