//! Error types for node operations.

/// Errors that can occur when talking to an Ergo node.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Transaction was rejected by the node.
    #[error("transaction rejected ({code}): {description}")]
    Rejected {
        /// HTTP status code of the rejection.
        code: u16,
        /// Human-readable rejection reason.
        description: String,
    },

    /// Node answered with an unexpected HTTP status.
    #[error("node returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Node answered with data that does not describe a valid object.
    #[error("invalid node response: {0}")]
    InvalidResponse(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,
}

impl NodeError {
    /// Map a transport error, folding reqwest timeouts into [`NodeError::Timeout`].
    pub fn from_http(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::HttpError(err)
        }
    }

    /// True if the call did not complete in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// True for failures worth retrying: timeouts, transport errors and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::HttpError(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
