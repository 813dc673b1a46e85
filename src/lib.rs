//! # Event Hubs Canary Library
//!
//! Publishes a small synthetic event to an Event Hubs / Service Bus REST
//! endpoint once per interval, signing requests with a SAS token derived from
//! the namespace connection string and regenerated after every failed send.
//!
//! Modules:
//! - `token` — connection secret parsing, endpoint derivation, SAS tokens
//! - `publisher` — HTTP publisher with a self-refreshing credential
//! - `probe` — cadence-controlled probe loop with cooperative cancellation
//! - `config` — service configuration, defaults and validation
//! - `observability` / `server` — prometheus metrics and their HTTP route

pub mod config;
pub mod helpers;
pub mod observability;
pub mod probe;
pub mod publisher;
pub mod server;
pub mod token;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::types::ServiceConfig;
pub use crate::probe::{ProbeLoop, ProbeReport, ProbeState};
pub use crate::publisher::{EndpointOrigin, Publish, PublishError, Publisher};
