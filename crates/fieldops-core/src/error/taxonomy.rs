//! Mapping from raw failure signals to [`Error`]s.

use super::{BoxError, Error, TimeoutPhase};
use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode, header::RETRY_AFTER};
use std::time::Duration;

/// A failure as observed at the transport boundary, before classification.
#[derive(Debug)]
pub enum FailureSignal {
    /// The server answered with a non-success status.
    Status {
        /// HTTP status code
        status: u16,
        /// Response headers, consulted for `Retry-After`
        headers: HeaderMap,
        /// Body text or short description; may be empty
        message: String,
    },
    /// Connection could not be established or was dropped.
    Connection(BoxError),
    /// No response arrived in time.
    Timeout(Option<BoxError>),
    /// The request was malformed before it was sent.
    Invalid(String),
    /// Anything else.
    Other(BoxError),
}

/// Classify a failure signal into exactly one error kind.
///
/// Statuses are mapped as follows:
///
/// | status         | kind             |
/// |----------------|------------------|
/// | 401, 403       | `Authentication` |
/// | 429            | `RateLimited`    |
/// | other 4xx      | `ClientFault`    |
/// | 5xx            | `ServerFault`    |
/// | anything else  | `ServerFault`    |
///
/// `Retry-After` is honored on 429 and 503.
pub fn classify(signal: FailureSignal) -> Error {
    classify_at(signal, Utc::now())
}

pub(crate) fn classify_at(signal: FailureSignal, now: DateTime<Utc>) -> Error {
    match signal {
        FailureSignal::Status {
            status,
            headers,
            message,
        } => classify_status(status, &headers, message, now),
        FailureSignal::Connection(source) => Error::Transport {
            message: source.to_string(),
            source: Some(source),
        },
        FailureSignal::Timeout(source) => Error::Timeout {
            phase: TimeoutPhase::Attempt,
            message: source
                .as_ref()
                .map_or_else(|| "no response before deadline".to_string(), ToString::to_string),
            source,
        },
        FailureSignal::Invalid(message) => Error::Validation { message },
        FailureSignal::Other(source) => Error::ServerFault {
            status: None,
            retry_after: None,
            message: source.to_string(),
            source: Some(source),
        },
    }
}

impl From<FailureSignal> for Error {
    fn from(signal: FailureSignal) -> Self {
        classify(signal)
    }
}

fn classify_status(status: u16, headers: &HeaderMap, message: String, now: DateTime<Utc>) -> Error {
    let message = if message.trim().is_empty() {
        canonical_reason(status)
    } else {
        message
    };

    match status {
        401 | 403 => Error::Authentication {
            status: Some(status),
            message,
        },
        429 => Error::RateLimited {
            retry_after: retry_after_header(headers, now),
            message,
        },
        400..=499 => Error::ClientFault { status, message },
        503 => Error::ServerFault {
            status: Some(status),
            retry_after: retry_after_header(headers, now),
            message,
            source: None,
        },
        _ => Error::ServerFault {
            status: Some(status),
            retry_after: None,
            message,
            source: None,
        },
    }
}

fn canonical_reason(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), ToString::to_string)
}

fn retry_after_header(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| parse_retry_after(value, now))
}

/// Parse a `Retry-After` value.
///
/// Accepts delta-seconds (`"120"`) or an HTTP-date
/// (`"Wed, 21 Oct 2015 07:28:00 GMT"`). A date in the past yields zero;
/// anything unparseable yields `None`.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}
