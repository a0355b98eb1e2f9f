//! Transport errors
//!
//! Every failure the transport can report falls into one of a few kinds.
//! The dispatch engine only cares whether a failure was a timeout or
//! something else; the extra detail is for logs and diagnostics.

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request did not complete within its time bound
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Connection refused, reset, DNS failure and similar
    #[error("Connection error: {0}")]
    Connection(String),

    /// The endpoint answered with a non-success HTTP status
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// The exchange broke in a way that is not the model's fault
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The transport itself could not be built
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TransportError {
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        TransportError::Timeout(msg.into())
    }

    pub fn connection<S: Into<String>>(msg: S) -> Self {
        TransportError::Connection(msg.into())
    }

    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        TransportError::Protocol(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout(_) | TransportError::Connection(_) => true,
            TransportError::Status { code, .. } => *code == 429 || *code >= 500,
            TransportError::Protocol(_) | TransportError::Configuration(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status {
                code: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_builder() {
            TransportError::Configuration(err.to_string())
        } else if err.is_decode() || err.is_body() {
            TransportError::Protocol(err.to_string())
        } else {
            TransportError::Connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::timeout("slow").is_retryable());
        assert!(TransportError::connection("refused").is_retryable());
        assert!(TransportError::Status { code: 503, body: String::new() }.is_retryable());
        assert!(TransportError::Status { code: 429, body: String::new() }.is_retryable());
        assert!(!TransportError::Status { code: 404, body: String::new() }.is_retryable());
        assert!(!TransportError::protocol("bad frame").is_retryable());
    }

    #[test]
    fn test_only_timeouts_are_timeouts() {
        assert!(TransportError::timeout("x").is_timeout());
        assert!(!TransportError::connection("x").is_timeout());
        assert!(!TransportError::Status { code: 504, body: String::new() }.is_timeout());
    }
}
