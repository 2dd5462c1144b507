use super::{BreakerConfig, CircuitState};
use crate::clock::{Clock, SystemClock};
use crate::{Error, ErrorKind};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Three-state circuit breaker.
///
/// All mutable state sits behind one mutex, so admission and the half-open
/// trial flag are checked and updated in the same critical section. The
/// lock is held only for bookkeeping, never across I/O or a sleep.
///
/// # Examples
///
/// ```rust
/// use fieldops_core::{BreakerConfig, CircuitBreaker, CircuitState, Error};
///
/// let breaker = CircuitBreaker::new(BreakerConfig::builder().failure_threshold(1).build());
///
/// let permit = breaker.admit().unwrap();
/// permit.failure(&Error::Transport { message: "reset".into(), source: None });
///
/// assert_eq!(breaker.state(), CircuitState::Open);
/// assert!(breaker.admit().is_err());
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<BreakerInner>,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    transitioned_at: Instant,
    trial_in_flight: bool,
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Success,
    Failure(ErrorKind),
    Released,
}

/// Point-in-time view of a breaker, for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    /// Current state
    pub state: CircuitState,
    /// Consecutive countable failures recorded while closed
    pub consecutive_failures: u32,
    /// Time since the last state transition
    pub since_transition: Duration,
    /// Whether a half-open trial is outstanding
    pub trial_in_flight: bool,
}

impl CircuitBreaker {
    /// Create a closed breaker using the system clock.
    pub fn new(config: BreakerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a closed breaker reading time from `clock`.
    pub fn with_clock(config: BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            config,
            clock,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                transitioned_at: now,
                trial_in_flight: false,
            }),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// The stored state.
    ///
    /// An open circuit whose cool-down has elapsed still reports `Open` until
    /// the next admission check moves it to `HalfOpen`.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Whether calls are currently being vetoed outright.
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Current counters and state.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = self.clock.now();
        let inner = self.lock();
        BreakerSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            since_transition: now.saturating_duration_since(inner.transitioned_at),
            trial_in_flight: inner.trial_in_flight,
        }
    }

    /// Ask to make a call.
    ///
    /// Returns a [`Permit`] to be settled with the call's outcome, or
    /// [`Error::CircuitOpen`] when the call must not be attempted.
    pub fn admit(&self) -> Result<Permit<'_>, Error> {
        let now = self.clock.now();
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => Ok(Permit::new(self, false)),
            CircuitState::Open => {
                let elapsed = now.saturating_duration_since(inner.transitioned_at);
                let open_duration = self.config.open_duration();
                if elapsed < open_duration {
                    return Err(Error::circuit_open(
                        Some(open_duration - elapsed),
                        format!(
                            "circuit opened after {} consecutive failures",
                            inner.consecutive_failures
                        ),
                    ));
                }

                inner.state = CircuitState::HalfOpen;
                inner.transitioned_at = now;
                inner.trial_in_flight = true;
                debug!(
                    cool_down_ms = open_duration.as_millis() as u64,
                    "circuit half-open, admitting trial"
                );
                Ok(Permit::new(self, true))
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    return Err(Error::circuit_open(None, "half-open trial in flight"));
                }
                inner.trial_in_flight = true;
                debug!("circuit half-open, admitting trial");
                Ok(Permit::new(self, true))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, trial: bool, outcome: Outcome) {
        let now = self.clock.now();
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => match outcome {
                Outcome::Success => inner.consecutive_failures = 0,
                Outcome::Failure(kind) if self.config.is_countable(kind) => {
                    inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                    if inner.consecutive_failures >= self.config.failure_threshold() {
                        inner.state = CircuitState::Open;
                        inner.transitioned_at = now;
                        warn!(
                            failures = inner.consecutive_failures,
                            %kind,
                            open_ms = self.config.open_duration().as_millis() as u64,
                            "circuit opened"
                        );
                    }
                }
                Outcome::Failure(_) | Outcome::Released => {}
            },
            CircuitState::HalfOpen if trial => {
                inner.trial_in_flight = false;
                match outcome {
                    Outcome::Failure(kind) if self.config.is_countable(kind) => {
                        inner.state = CircuitState::Open;
                        inner.transitioned_at = now;
                        warn!(%kind, "half-open trial failed, circuit reopened");
                    }
                    Outcome::Success | Outcome::Failure(_) => {
                        inner.state = CircuitState::Closed;
                        inner.consecutive_failures = 0;
                        inner.transitioned_at = now;
                        info!("half-open trial succeeded, circuit closed");
                    }
                    Outcome::Released => {
                        debug!("half-open trial released without outcome");
                    }
                }
            }
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

/// Admission token returned by [`CircuitBreaker::admit`].
///
/// Settle it with [`success`](Self::success), [`failure`](Self::failure) or
/// [`release`](Self::release). Dropping it unsettled counts as a release, so a
/// cancelled half-open trial frees its slot.
#[derive(Debug)]
#[must_use = "a permit must be settled with the call's outcome"]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            trial,
            settled: false,
        }
    }

    /// Whether this permit is the half-open trial.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// Record a successful call.
    pub fn success(mut self) {
        self.settle(Outcome::Success);
    }

    /// Record a failed call, judged on the root kind of `error`.
    pub fn failure(mut self, error: &Error) {
        self.settle(Outcome::Failure(error.root_kind()));
    }

    /// Give the permit back without recording an outcome.
    pub fn release(mut self) {
        self.settle(Outcome::Released);
    }

    fn settle(&mut self, outcome: Outcome) {
        self.settled = true;
        self.breaker.settle(self.trial, outcome);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(Outcome::Released);
        }
    }
}
