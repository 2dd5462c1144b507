//! Backoff delay computation.
//!
//! For the attempt `n` that just failed (1-indexed):
//!
//! ```text
//! base     = min(max_delay, base_delay * multiplier^(n - 1))
//! jittered = jitter(base)
//! delay    = max(jittered, hint)
//! ```
//!
//! A server hint is a floor: jitter never shortens it and `max_delay` never
//! caps it.

use super::policy::{Jitter, RetryPolicy};
use rand::Rng;
use std::time::Duration;

/// Delay to wait after `attempt` failed.
pub fn delay(attempt: u32, policy: &RetryPolicy, hint: Option<Duration>) -> Duration {
    let jittered = apply_jitter(
        exponential(attempt, policy),
        policy.jitter(),
        &mut rand::thread_rng(),
    );

    match hint {
        Some(hint) => jittered.max(hint),
        None => jittered,
    }
}

/// The capped exponential delay for `attempt`, before jitter.
pub fn exponential(attempt: u32, policy: &RetryPolicy) -> Duration {
    let base = policy.base_delay();
    let max = policy.max_delay();
    if base.is_zero() {
        return Duration::ZERO;
    }

    let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let nanos = base.as_nanos() as f64 * policy.multiplier().powi(exponent);

    if !nanos.is_finite() || nanos >= max.as_nanos() as f64 {
        return max;
    }
    Duration::from_nanos(nanos.round() as u64).min(max)
}

fn apply_jitter<R: Rng + ?Sized>(value: Duration, jitter: Jitter, rng: &mut R) -> Duration {
    if value.is_zero() {
        return value;
    }
    let jittered = match jitter {
        Jitter::None => value,
        Jitter::Full => value.mul_f64(rng.gen_range(0.0..=1.0)),
        Jitter::Equal => {
            let half = value / 2;
            half + half.mul_f64(rng.gen_range(0.0..=1.0))
        }
    };
    // float rounding in mul_f64 can overshoot by a nanosecond
    jittered.min(value)
}
