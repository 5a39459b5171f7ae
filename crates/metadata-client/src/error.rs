use reqwest::Method;
use thiserror::Error;

use crate::Operation;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    #[error("error decoding response from {method} {url}: {source}")]
    Decode {
        method: Method,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A create succeeded but the response carried no id for the new object.
    #[error("{method} {url} returned no id")]
    MissingId { method: Method, url: String },

    /// The service refused the operation without an HTTP-level failure.
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: Operation,
        message: String,
    },
}

impl ClientError {
    /// HTTP status returned by the service, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
