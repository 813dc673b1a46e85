use thiserror::Error;

/// Errors raised while turning a connection secret into a credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The secret lacks one of `Endpoint`, `EntityPath`, `SharedAccessKeyName`
    /// or `SharedAccessKey`, or one of them is empty.
    #[error("malformed connection secret: {0}")]
    MalformedSecret(String),
}
