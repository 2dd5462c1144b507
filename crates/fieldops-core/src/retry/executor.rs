//! The retry loop.

use super::policy::RetryPolicy;
use crate::{Error, ErrorKind, TimeoutPhase};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Bookkeeping for one logical call.
///
/// Owned by the caller and never shared between calls.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    attempt: u32,
    started: Instant,
    deadline: Option<Instant>,
    last_kind: Option<ErrorKind>,
}

impl AttemptContext {
    /// A fresh context starting at attempt 1, without a deadline.
    pub fn new() -> Self {
        Self {
            attempt: 1,
            started: Instant::now(),
            deadline: None,
            last_kind: None,
        }
    }

    /// Bound the whole call, retries and waits included, to `budget` from now.
    pub fn with_deadline(mut self, budget: Duration) -> Self {
        self.deadline = Some(self.started + budget);
        self
    }

    /// Bound the whole call to an absolute instant.
    pub fn with_deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The current attempt number, starting at 1.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// When the call started.
    pub fn started(&self) -> Instant {
        self.started
    }

    /// Time since the call started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Kind of the most recent failure.
    pub fn last_kind(&self) -> Option<ErrorKind> {
        self.last_kind
    }

    /// Whether this is a retry rather than the first attempt.
    pub fn is_retry(&self) -> bool {
        self.attempt > 1
    }
}

impl Default for AttemptContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one logical call under a [`RetryPolicy`].
///
/// # Examples
///
/// ```rust
/// use fieldops_core::{AttemptContext, Error, FailureSignal, RetryExecutor, RetryPolicy};
/// use http::HeaderMap;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let policy = RetryPolicy::builder()
///     .base_delay(Duration::from_millis(1))
///     .build();
///
/// let mut ctx = AttemptContext::new();
/// let result = RetryExecutor::new(&policy)
///     .run(&mut ctx, |ctx| {
///         let attempt = ctx.attempt();
///         async move {
///             if attempt < 2 {
///                 Err(FailureSignal::Status {
///                     status: 502,
///                     headers: HeaderMap::new(),
///                     message: String::new(),
///                 })
///             } else {
///                 Ok("done")
///             }
///         }
///     })
///     .await;
///
/// assert_eq!(result.unwrap(), "done");
/// assert_eq!(ctx.attempt(), 2);
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryExecutor<'p> {
    policy: &'p RetryPolicy,
}

impl<'p> RetryExecutor<'p> {
    /// Create an executor borrowing `policy`.
    pub fn new(policy: &'p RetryPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        self.policy
    }

    /// Run `op` until it succeeds, fails with a non-retryable kind, runs out
    /// of attempts or hits the context's deadline.
    ///
    /// When retryable failures use up every attempt and at least one retry
    /// happened, the result is [`Error::RetryExhausted`] wrapping the last
    /// failure. With a single permitted attempt the concrete error is
    /// returned as is.
    pub async fn run<T, E, F, Fut>(&self, ctx: &mut AttemptContext, mut op: F) -> Result<T, Error>
    where
        F: FnMut(&AttemptContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Error>,
    {
        loop {
            let outcome = match ctx.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, op(ctx)).await {
                    Ok(outcome) => outcome.map_err(Into::into),
                    Err(_) => Err(Error::Timeout {
                        phase: TimeoutPhase::Attempt,
                        message: format!("deadline reached during attempt {}", ctx.attempt),
                        source: None,
                    }),
                },
                None => op(ctx).await.map_err(Into::into),
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let kind = error.kind();
            ctx.last_kind = Some(kind);

            if !self.policy.is_retryable(kind) {
                debug!(attempt = ctx.attempt, %kind, "not retrying");
                return Err(error);
            }

            if ctx.attempt >= self.policy.max_attempts() {
                debug!(attempt = ctx.attempt, %kind, "retries exhausted");
                if ctx.attempt > 1 {
                    return Err(Error::RetryExhausted {
                        attempts: ctx.attempt,
                        last: Box::new(error),
                    });
                }
                return Err(error);
            }

            let wait = self.policy.delay_for(ctx.attempt, error.retry_after());

            if let Some(deadline) = ctx.deadline
                && Instant::now() + wait >= deadline
            {
                debug!(
                    attempt = ctx.attempt,
                    delay_ms = wait.as_millis() as u64,
                    "backoff would cross deadline"
                );
                return Err(Error::Timeout {
                    phase: TimeoutPhase::Backoff,
                    message: format!(
                        "deadline reached while backing off after attempt {}",
                        ctx.attempt
                    ),
                    source: Some(Box::new(error)),
                });
            }

            debug!(
                attempt = ctx.attempt,
                %kind,
                delay_ms = wait.as_millis() as u64,
                "retrying after failure"
            );
            tokio::time::sleep(wait).await;
            ctx.attempt += 1;
        }
    }
}
