use reqwest::StatusCode;
use thiserror::Error;

use crate::observability::metrics::{REASON_REJECTED, REASON_TRANSPORT};

/// Outcome of a single failed publish attempt. Both kinds are recoverable:
/// the publisher refreshes its credential and the probe moves on.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The broker answered with a non-2xx status.
    #[error("received {status} when publishing message: {body}")]
    Rejected { status: StatusCode, body: String },

    /// Connect, TLS, timeout or request building failure.
    #[error("transport error when publishing message: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PublishError {
    /// Metric label for this failure.
    pub fn reason(&self) -> &'static str {
        match self {
            PublishError::Rejected { .. } => REASON_REJECTED,
            PublishError::Transport(_) => REASON_TRANSPORT,
        }
    }
}
