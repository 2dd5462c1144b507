//! Transport error types

use fieldops_core::{BoxError, Error as CallError, FailureSignal, error_boundary};
use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while exchanging a request with the server
///
/// A non-success status is not a transport error; only failures to complete
/// the exchange end up here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure or reset
    #[error("connection error: {0}")]
    Connection(#[source] BoxError),

    /// No response within the request timeout
    #[error("request timed out")]
    Timeout(#[source] Option<BoxError>),

    /// The exchange started but failed while sending or reading
    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    /// The request could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Generic transport error
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(Some(Box::new(err)))
        } else if err.is_connect() {
            Self::Connection(Box::new(err))
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if err.is_request() || err.is_body() || err.is_decode() {
            Self::Request(Box::new(err))
        } else {
            Self::Other(err.to_string())
        }
    }
}

error_boundary!(TransportError => FailureSignal, |e| {
    match e {
        TransportError::Connection(source) | TransportError::Request(source) => {
            FailureSignal::Connection(source)
        }
        TransportError::Timeout(source) => FailureSignal::Timeout(source),
        TransportError::InvalidRequest(message) => FailureSignal::Invalid(message),
        TransportError::Other(message) => FailureSignal::Other(message.into()),
    }
});

error_boundary!(TransportError => CallError, |e| {
    fieldops_core::classify(FailureSignal::from(e))
});

#[cfg(test)]
mod tests {
    use super::*;
    use fieldops_core::ErrorKind;
    use rstest::rstest;
    use std::io;

    fn io_error() -> BoxError {
        Box::new(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
    }

    #[rstest]
    #[case(TransportError::Connection(io_error()), ErrorKind::Transport)]
    #[case(TransportError::Request(io_error()), ErrorKind::Transport)]
    #[case(TransportError::Timeout(None), ErrorKind::Timeout)]
    #[case(TransportError::InvalidRequest("bad url".into()), ErrorKind::Validation)]
    #[case(TransportError::Other("???".into()), ErrorKind::ServerFault)]
    fn test_classification(#[case] error: TransportError, #[case] expected: ErrorKind) {
        let classified: CallError = error.into();
        assert_eq!(classified.kind(), expected);
    }

    #[test]
    fn test_display_includes_cause() {
        let error = TransportError::Connection(io_error());
        assert_eq!(error.to_string(), "connection error: reset by peer");
        assert!(!error.is_timeout());
        assert!(TransportError::Timeout(None).is_timeout());
    }
}
