//! # Client Error Types
//!
//! Failures at the service boundary, split by how the engine reacts:
//! a stock conflict keeps the cart and asks for a catalog refresh, a
//! transport failure keeps the cart and invites a plain retry, and any
//! other server rejection is surfaced verbatim to the operator.

use thiserror::Error;

/// Result type alias for backend operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors from the remote order/catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never completed (DNS, connect, broken pipe, ...).
    #[error("network failure: {0}")]
    Network(String),

    /// The request exceeded the client timeout.
    #[error("request timed out")]
    Timeout,

    /// Server rejected the transaction because authoritative stock changed
    /// since the last catalog refresh.
    #[error("stock conflict: {message}")]
    StockConflict { message: String },

    /// Any other non-success response from the service.
    #[error("service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded into the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The configured base URL cannot be extended with a request path.
    #[error("invalid service URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Whether settling again without changing the cart could succeed.
    ///
    /// Stock conflicts are not retryable as-is: the operator must refresh
    /// the catalog (and possibly adjust the cart) first.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
