//! Error types for the protest API client.

use thiserror::Error;

/// Protest API client errors.
#[derive(Error, Debug)]
pub enum ProtestApiError {
    /// A required authorization header was not supplied.
    #[error("'{0}' must be specified in the authorization headers")]
    MissingHeader(&'static str),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Result type for protest API operations.
pub type Result<T> = std::result::Result<T, ProtestApiError>;
