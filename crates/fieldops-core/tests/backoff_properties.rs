//! Property-based tests for backoff computation and retry classification.

use fieldops_core::retry::{delay, exponential};
use fieldops_core::{ErrorKind, Jitter, RetryPolicy};
use proptest::prelude::*;
use std::time::Duration;

fn arb_jitter() -> impl Strategy<Value = Jitter> {
    prop_oneof![Just(Jitter::None), Just(Jitter::Full), Just(Jitter::Equal)]
}

fn arb_policy() -> impl Strategy<Value = RetryPolicy> {
    (
        1u32..10,
        0u64..5_000,
        0u64..120_000,
        1.0f64..8.0,
        arb_jitter(),
    )
        .prop_map(|(attempts, base_ms, max_ms, multiplier, jitter)| {
            RetryPolicy::builder()
                .max_attempts(attempts)
                .base_delay(Duration::from_millis(base_ms))
                .max_delay(Duration::from_millis(max_ms))
                .multiplier(multiplier)
                .jitter(jitter)
                .build()
        })
}

fn arb_kind() -> impl Strategy<Value = ErrorKind> {
    prop_oneof![
        Just(ErrorKind::Transport),
        Just(ErrorKind::Timeout),
        Just(ErrorKind::Authentication),
        Just(ErrorKind::RateLimited),
        Just(ErrorKind::ClientFault),
        Just(ErrorKind::ServerFault),
        Just(ErrorKind::CircuitOpen),
        Just(ErrorKind::RetryExhausted),
        Just(ErrorKind::Validation),
    ]
}

proptest! {
    /// Without a hint, no delay exceeds the cap.
    #[test]
    fn prop_delay_never_exceeds_max(policy in arb_policy(), attempt in 1u32..64) {
        prop_assert!(delay(attempt, &policy, None) <= policy.max_delay());
    }

    /// The un-jittered delay never shrinks as attempts increase.
    #[test]
    fn prop_exponential_is_non_decreasing(policy in arb_policy(), attempt in 1u32..63) {
        prop_assert!(exponential(attempt, &policy) <= exponential(attempt + 1, &policy));
    }

    /// A hint of H always yields at least H.
    #[test]
    fn prop_hint_is_honored(
        policy in arb_policy(),
        attempt in 1u32..16,
        hint_secs in 0u64..3_600,
    ) {
        let hint = Duration::from_secs(hint_secs);
        prop_assert!(delay(attempt, &policy, Some(hint)) >= hint);
    }

    /// Jittered delays stay within the band their mode allows.
    #[test]
    fn prop_jitter_band(policy in arb_policy(), attempt in 1u32..16) {
        let base = exponential(attempt, &policy);
        let d = delay(attempt, &policy, None);
        match policy.jitter() {
            Jitter::None => prop_assert_eq!(d, base),
            Jitter::Full => prop_assert!(d <= base),
            Jitter::Equal => prop_assert!(d >= base / 2 && d <= base),
        }
    }

    /// Validation failures are never retried, whatever the policy says.
    #[test]
    fn prop_validation_never_retryable(
        kinds in proptest::collection::vec(arb_kind(), 0..9),
    ) {
        let policy = RetryPolicy::builder().retryable(kinds).build();
        prop_assert!(!policy.is_retryable(ErrorKind::Validation));
        prop_assert!(!policy.is_retryable(ErrorKind::CircuitOpen));
    }
}
