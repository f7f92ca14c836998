//! Error types for the Pocket Bar client
//!
//! These are local faults only. Anything the server actually answered, including
//! non-2xx statuses, is reported through [`crate::ApiResponse`] instead.

use crate::transport::TransportError;
use crate::types::Credential;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rejected locally, nothing was sent to the server
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The credential was renewed but the retried call never got a status back.
    /// The renewed credential is still the latest valid one and must be stored.
    #[error("Transport failure after credential renewal: {source}")]
    TransportAfterRenewal {
        renewed: Box<Credential>,
        #[source]
        source: TransportError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Credential renewed before the failure happened, if any
    pub fn renewed_credential(&self) -> Option<&Credential> {
        match self {
            ClientError::TransportAfterRenewal { renewed, .. } => Some(renewed),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
