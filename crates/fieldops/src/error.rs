//! Error types for the fieldops client
//!
//! Failures of an outbound call surface as [`Error::Call`], wrapping the
//! execution layer's [`fieldops_core::Error`] so callers can match on its
//! [`ErrorKind`]. The remaining variants cover construction and decoding.

use fieldops_core::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail with a fieldops client error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the fieldops client.
#[derive(Debug, Error)]
pub enum Error {
    /// An outbound call failed; see [`Error::kind`].
    #[error(transparent)]
    Call(#[from] fieldops_core::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid HTTP header name.
    #[error("Invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("Invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// Missing required configuration.
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// Context description
        context: String,
        /// Underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Other errors not covered by specific variants.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Kind of the call failure, if this error came from an outbound call.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Call(err) => Some(err.kind()),
            Error::WithContext { source, .. } => source
                .downcast_ref::<Error>()
                .and_then(Error::kind),
            _ => None,
        }
    }

    /// The call failure, if any.
    pub fn as_call(&self) -> Option<&fieldops_core::Error> {
        match self {
            Error::Call(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status attached to the call failure, if any.
    pub fn status(&self) -> Option<u16> {
        self.as_call().and_then(fieldops_core::Error::status)
    }

    /// Server-supplied retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        self.as_call().and_then(fieldops_core::Error::retry_after)
    }

    /// Check if the call was vetoed by the circuit breaker.
    pub fn is_circuit_open(&self) -> bool {
        self.kind() == Some(ErrorKind::CircuitOpen)
    }

    /// Add context to an error.
    pub fn context<C>(self, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        Error::WithContext {
            context: context.to_string(),
            source: Box::new(self),
        }
    }
}

// Helper structures for parsing API error bodies

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Nested { error: ApiErrorDetails },
    Flat(ApiErrorDetails),
    Text { error: String },
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorDetails {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Best-effort human-readable message from an error response body.
///
/// Understands `{"error": {"message": ..}}`, `{"message": ..}` and
/// `{"error": ".."}`; anything else is returned as trimmed text.
pub(crate) fn message_from_body(body: &[u8]) -> String {
    const MAX_LEN: usize = 512;

    if let Ok(parsed) = serde_json::from_slice::<ApiErrorBody>(body) {
        return match parsed {
            ApiErrorBody::Nested { error } | ApiErrorBody::Flat(error) => match error.code {
                Some(code) => format!("{} ({code})", error.message),
                None => error.message,
            },
            ApiErrorBody::Text { error } => error,
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
