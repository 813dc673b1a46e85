pub mod client;
pub mod error;

pub use client::{EndpointOrigin, Publish, Publisher};
pub use error::PublishError;
