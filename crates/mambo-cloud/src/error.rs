//! Error types for cloud calls

use thiserror::Error;

/// Result type for cloud calls
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors returned by the Mambo cloud client
#[derive(Debug, Error)]
pub enum CloudError {
    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The cloud answered with a non-success status
    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("invalid response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {path} has no {field}")]
    MissingField { path: String, field: &'static str },

    #[error("not authenticated")]
    NotAuthenticated,
}

impl CloudError {
    /// HTTP status of the failed call, when the cloud answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            CloudError::Status { status, .. } => Some(*status),
            CloudError::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
