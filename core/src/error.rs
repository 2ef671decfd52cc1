//! Error types for the MVP activities client.
//!
//! # Design
//! Every failure the client can produce lands in one enum. `Config` is only
//! raised while resolving credentials, `NotInitialized` only before the user
//! profile has been fetched. Any response with status >= 400 becomes
//! `Request` carrying the raw body, which is usually the only explanation the
//! service gives.

use thiserror::Error;

/// Errors returned by `MvpActivitiesClient` and its transports.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required credential was neither passed in nor set in the environment.
    #[error("{0}")]
    Config(String),

    /// A data operation ran before `initialize()` fetched the user profile.
    #[error("client not initialized, call initialize() first")]
    NotInitialized,

    /// The service answered with a status code >= 400.
    #[error("HTTP {status}: {body}")]
    Request { status: u16, body: String },

    /// The HTTP round-trip itself failed.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Raw response body for `Request` errors.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Request { body, .. } => Some(body),
            _ => None,
        }
    }
}
