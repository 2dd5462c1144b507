//! Structured logging for outbound calls
//!
//! Every call made through [`Client::execute`](crate::Client::execute) is
//! logged here: one `debug!` when it starts, then one `info!` on success or
//! one `warn!` on failure. Per-attempt and per-retry events come from
//! `fieldops_core`.

use fieldops_core::{CircuitState, Error as CallError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Path relative to the base URL
    pub path: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log the call being started
    pub fn log_request(&self) {
        debug!(
            method = %self.method,
            path = %self.path,
            body_size = self.body_size,
            "Starting call"
        );
    }
}

/// Outcome metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code, if a response was received
    pub status: Option<u16>,
    /// Response body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Time elapsed for the whole call
    pub elapsed: Duration,
    /// Number of attempts made
    pub attempts: u32,
}

impl ResponseMetadata {
    /// Create new outcome metadata
    pub fn new(elapsed: Duration, attempts: u32) -> Self {
        Self {
            status: None,
            body_size: None,
            elapsed,
            attempts,
        }
    }

    /// Set the HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log a successful call
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            body_size = self.body_size,
            attempts = self.attempts,
            "Call succeeded"
        );
    }

    /// Log a failed call together with the breaker state it left behind
    pub fn log_error(&self, request: &RequestMetadata, error: &CallError, circuit: CircuitState) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = error.status(),
            kind = %error.kind(),
            elapsed_ms = self.elapsed.as_millis() as u64,
            attempts = self.attempts,
            %circuit,
            error = %error,
            "Call failed"
        );
    }
}

/// Timer for measuring call duration
///
/// Follows tokio's clock, so paused-time tests see virtual durations.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Does nothing if a global subscriber is already set.
#[cfg(feature = "trace")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
