//! Retry configuration.

use crate::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);
const DEFAULT_MULTIPLIER: f64 = 2.0;

/// How randomness is applied to a computed backoff delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Jitter {
    /// Use the exponential delay as is.
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// `delay / 2` plus uniform in `[0, delay / 2]`.
    #[default]
    Equal,
}

/// Immutable retry configuration.
///
/// `max_attempts` counts every attempt including the first, so a policy with
/// `max_attempts = 1` never retries.
///
/// # Examples
///
/// ```rust
/// use fieldops_core::{ErrorKind, Jitter, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::builder()
///     .max_attempts(5)
///     .base_delay(Duration::from_millis(250))
///     .max_delay(Duration::from_secs(10))
///     .multiplier(1.5)
///     .jitter(Jitter::Full)
///     .build();
///
/// assert_eq!(policy.max_attempts(), 5);
/// assert!(policy.is_retryable(ErrorKind::ServerFault));
/// assert!(!policy.is_retryable(ErrorKind::ClientFault));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRetryPolicy")]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: Jitter,
    retryable: HashSet<ErrorKind>,
}

impl RetryPolicy {
    /// Start building a policy from the defaults.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// A builder pre-filled with this policy's values.
    pub fn to_builder(&self) -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            max_attempts: Some(self.max_attempts),
            base_delay: Some(self.base_delay),
            max_delay: Some(self.max_delay),
            multiplier: Some(self.multiplier),
            jitter: Some(self.jitter),
            retryable: Some(self.retryable.clone()),
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::builder().max_attempts(1).build()
    }

    /// Total attempts allowed, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the first retry, before jitter.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Upper bound on the computed delay (a server hint may exceed it).
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Growth factor between consecutive delays.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Jitter mode.
    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// Kinds this policy will retry.
    pub fn retryable(&self) -> &HashSet<ErrorKind> {
        &self.retryable
    }

    /// Whether a failure of `kind` may be retried.
    ///
    /// `Validation`, `CircuitOpen` and `RetryExhausted` are never retried,
    /// whatever the configured set says.
    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Validation | ErrorKind::CircuitOpen | ErrorKind::RetryExhausted => false,
            other => self.retryable.contains(&other),
        }
    }

    /// Delay to wait after `attempt` failed, honoring an optional server hint.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        super::delay(attempt, self, hint)
    }
}

impl Default for RetryPolicy {
    /// 3 attempts, 500ms base, 30s cap, doubling, equal jitter, transient kinds retried.
    fn default() -> Self {
        RetryPolicyBuilder::default().build()
    }
}

/// Builder for [`RetryPolicy`].
///
/// Out-of-range values are clamped on [`build`](Self::build) rather than
/// rejected.
#[derive(Debug, Default, Clone)]
pub struct RetryPolicyBuilder {
    max_attempts: Option<u32>,
    base_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<Jitter>,
    retryable: Option<HashSet<ErrorKind>>,
}

impl RetryPolicyBuilder {
    /// Total attempts including the first. Clamped to at least 1.
    ///
    /// Default: 3
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Delay before the first retry.
    ///
    /// Default: 500ms
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    /// Cap on the computed delay. Raised to `base_delay` if lower.
    ///
    /// Default: 30s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Exponential growth factor. Clamped to at least 1.0.
    ///
    /// Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Jitter mode.
    ///
    /// Default: [`Jitter::Equal`]
    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Replace the set of retryable kinds.
    pub fn retryable(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable = Some(kinds.into_iter().collect());
        self
    }

    /// Build the policy, clamping out-of-range values.
    pub fn build(self) -> RetryPolicy {
        let base_delay = self.base_delay.unwrap_or(DEFAULT_BASE_DELAY);
        let max_delay = self.max_delay.unwrap_or(DEFAULT_MAX_DELAY).max(base_delay);
        let multiplier = match self.multiplier {
            Some(m) if m.is_finite() => m.max(1.0),
            Some(_) | None => DEFAULT_MULTIPLIER,
        };

        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            base_delay,
            max_delay,
            multiplier,
            jitter: self.jitter.unwrap_or_default(),
            retryable: self
                .retryable
                .unwrap_or_else(|| ErrorKind::TRANSIENT.into_iter().collect()),
        }
    }
}

/// On-disk shape of a retry policy; durations are milliseconds.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawRetryPolicy {
    max_attempts: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    multiplier: Option<f64>,
    jitter: Option<Jitter>,
    retryable: Option<Vec<ErrorKind>>,
}

impl From<RawRetryPolicy> for RetryPolicy {
    fn from(raw: RawRetryPolicy) -> Self {
        RetryPolicyBuilder {
            max_attempts: raw.max_attempts,
            base_delay: raw.base_delay_ms.map(Duration::from_millis),
            max_delay: raw.max_delay_ms.map(Duration::from_millis),
            multiplier: raw.multiplier,
            jitter: raw.jitter,
            retryable: raw.retryable.map(|kinds| kinds.into_iter().collect()),
        }
        .build()
    }
}
