//! Error taxonomy for outbound calls.
//!
//! Every failure a caller can observe is an [`Error`], and every [`Error`]
//! maps to exactly one [`ErrorKind`]. Raw failure signals coming out of the
//! transport are turned into errors by [`classify`].

mod boundary;
mod taxonomy;

pub use taxonomy::{FailureSignal, classify, parse_retry_after};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Boxed cause carried by transport-level errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for the execution layer.
pub type Result<T> = std::result::Result<T, Error>;

/// The closed set of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connection refused, DNS failure or socket reset.
    Transport,
    /// No response before the deadline.
    Timeout,
    /// 401 or 403.
    Authentication,
    /// 429.
    RateLimited,
    /// Any other 4xx.
    ClientFault,
    /// 5xx, or any failure that matched nothing else.
    ServerFault,
    /// Call vetoed locally by the circuit breaker.
    CircuitOpen,
    /// Every permitted attempt failed.
    RetryExhausted,
    /// Malformed input detected before anything was sent.
    Validation,
}

impl ErrorKind {
    /// Kinds that indicate a transient condition on the remote side.
    ///
    /// Used as the default retryable set and the default set of failures
    /// counted by the circuit breaker.
    pub const TRANSIENT: [ErrorKind; 4] = [
        ErrorKind::Transport,
        ErrorKind::Timeout,
        ErrorKind::ServerFault,
        ErrorKind::RateLimited,
    ];

    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Authentication => "authentication",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ClientFault => "client_fault",
            ErrorKind::ServerFault => "server_fault",
            ErrorKind::CircuitOpen => "circuit_open",
            ErrorKind::RetryExhausted => "retry_exhausted",
            ErrorKind::Validation => "validation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a timeout happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    /// A network attempt ran out of time.
    Attempt,
    /// The caller's deadline expired while waiting between attempts; no
    /// network attempt was in flight.
    Backoff,
}

impl fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutPhase::Attempt => f.write_str("attempt"),
            TimeoutPhase::Backoff => f.write_str("backoff"),
        }
    }
}

/// Error surfaced by the execution layer.
///
/// One variant per [`ErrorKind`]. The shared metadata (status, retry-after
/// hint, message, cause) is reachable through accessors so retry logic can
/// stay generic while callers still match exhaustively.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection-level failure.
    #[error("transport failure: {message}")]
    Transport {
        /// Human-readable description
        message: String,
        /// Underlying I/O or client error
        #[source]
        source: Option<BoxError>,
    },

    /// No response in time.
    #[error("timed out during {phase}: {message}")]
    Timeout {
        /// Whether a network attempt or a backoff wait was cut short
        phase: TimeoutPhase,
        /// Human-readable description
        message: String,
        /// Underlying cause, or the last attempt's error for backoff timeouts
        #[source]
        source: Option<BoxError>,
    },

    /// Credentials rejected, or the header provider could not produce them.
    #[error("authentication failed: {message}")]
    Authentication {
        /// 401/403, or `None` when the failure happened locally
        status: Option<u16>,
        /// Human-readable description
        message: String,
    },

    /// Server asked us to slow down.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Parsed `Retry-After` hint
        retry_after: Option<Duration>,
        /// Human-readable description
        message: String,
    },

    /// Request rejected as the caller's fault.
    #[error("client fault (status {status}): {message}")]
    ClientFault {
        /// HTTP status
        status: u16,
        /// Human-readable description
        message: String,
    },

    /// Remote failure, or anything that could not be classified.
    #[error("server fault: {message}")]
    ServerFault {
        /// HTTP status, if the failure came with one
        status: Option<u16>,
        /// Parsed `Retry-After` hint (503 only)
        retry_after: Option<Duration>,
        /// Human-readable description
        message: String,
        /// Underlying cause for unclassified failures
        #[source]
        source: Option<BoxError>,
    },

    /// Vetoed by the circuit breaker; nothing was sent.
    #[error("circuit open: {message}")]
    CircuitOpen {
        /// Remaining cool-down, when known
        retry_in: Option<Duration>,
        /// Human-readable description
        message: String,
    },

    /// Retries used up on a retryable failure.
    #[error("gave up after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The last concrete failure
        #[source]
        last: Box<Error>,
    },

    /// Caller-side defect; never retried.
    #[error("invalid request: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },
}

impl Error {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::ClientFault { .. } => ErrorKind::ClientFault,
            Error::ServerFault { .. } => ErrorKind::ServerFault,
            Error::CircuitOpen { .. } => ErrorKind::CircuitOpen,
            Error::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            Error::Validation { .. } => ErrorKind::Validation,
        }
    }

    /// The kind of the concrete failure, looking through `RetryExhausted`.
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            Error::RetryExhausted { last, .. } => last.root_kind(),
            other => other.kind(),
        }
    }

    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } | Error::ServerFault { status, .. } => *status,
            Error::RateLimited { .. } => Some(429),
            Error::ClientFault { status, .. } => Some(*status),
            Error::RetryExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Server-supplied minimum wait before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after, .. } | Error::ServerFault { retry_after, .. } => {
                *retry_after
            }
            Error::CircuitOpen { retry_in, .. } => *retry_in,
            Error::RetryExhausted { last, .. } => last.retry_after(),
            _ => None,
        }
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::Transport { message, .. }
            | Error::Timeout { message, .. }
            | Error::Authentication { message, .. }
            | Error::RateLimited { message, .. }
            | Error::ClientFault { message, .. }
            | Error::ServerFault { message, .. }
            | Error::CircuitOpen { message, .. }
            | Error::Validation { message } => message,
            Error::RetryExhausted { last, .. } => last.message(),
        }
    }

    /// Number of attempts made, when known.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Error::RetryExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Whether this is a timeout raised while waiting between attempts.
    pub fn is_backoff_timeout(&self) -> bool {
        matches!(
            self,
            Error::Timeout {
                phase: TimeoutPhase::Backoff,
                ..
            }
        )
    }

    /// Build a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Build a [`Error::CircuitOpen`].
    pub fn circuit_open(retry_in: Option<Duration>, message: impl Into<String>) -> Self {
        Error::CircuitOpen {
            retry_in,
            message: message.into(),
        }
    }

    /// Build a [`Error::Authentication`] for a failure that never reached the server.
    pub fn credentials(message: impl Into<String>) -> Self {
        Error::Authentication {
            status: None,
            message: message.into(),
        }
    }
}
