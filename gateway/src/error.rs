//! Error types for the commerce gateway client.

use thiserror::Error;

/// Errors that can occur when talking to the remote commerce backend.
///
/// Every variant is recoverable from the caller's point of view: the
/// orchestration layer rolls local state back and surfaces a transient
/// notice, it never aborts the process.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// HTTP request failed at the transport level
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Request exceeded the configured deadline
    #[error("request timed out")]
    Timeout,

    /// Credential was missing or rejected by the backend
    #[error("unauthorized - credential rejected")]
    Unauthorized,

    /// Backend returned a non-2xx response
    #[error("api error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error body returned by the backend
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("response parsing failed: {0}")]
    ResponseParseFailed(String),
}

impl GatewayError {
    pub(crate) fn transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}
