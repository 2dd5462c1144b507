//! Retry policy, backoff computation and the retry loop.
//!
//! # Key Types
//!
//! - [`RetryPolicy`] - immutable retry configuration
//! - [`Jitter`] - randomization mode applied to each delay
//! - [`RetryExecutor`] - runs one logical call under a policy
//! - [`AttemptContext`] - per-call bookkeeping, including an optional deadline
//!
//! # Examples
//!
//! ```rust
//! use fieldops_core::retry::{RetryPolicy, delay};
//! use fieldops_core::Jitter;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::builder()
//!     .base_delay(Duration::from_millis(200))
//!     .max_delay(Duration::from_secs(5))
//!     .jitter(Jitter::None)
//!     .build();
//!
//! assert_eq!(delay(1, &policy, None), Duration::from_millis(200));
//! assert_eq!(delay(3, &policy, None), Duration::from_millis(800));
//! assert_eq!(delay(1, &policy, Some(Duration::from_secs(10))), Duration::from_secs(10));
//! ```

mod backoff;
mod executor;
mod policy;

pub use backoff::{delay, exponential};
pub use executor::{AttemptContext, RetryExecutor};
pub use policy::{Jitter, RetryPolicy, RetryPolicyBuilder};
