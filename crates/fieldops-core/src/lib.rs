#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Fault-tolerant call execution for the fieldops client.
//!
//! Every outbound request issued by the fieldops client passes through the
//! pieces in this crate:
//!
//! - **Error taxonomy** via [`Error`], [`ErrorKind`] and [`FailureSignal`]
//!   - every failure maps to exactly one closed kind
//!   - `Retry-After` hints parsed from delta-seconds or HTTP-dates
//! - **Backoff policy** via [`RetryPolicy`] and [`retry::delay`]
//!   - exponential growth capped at a maximum delay
//!   - `none`, `full` and `equal` jitter
//! - **Retry executor** via [`RetryExecutor`] and [`AttemptContext`]
//! - **Circuit breaker** via [`CircuitBreaker`] and its RAII [`Permit`]
//!
//! The transport and the client crates build on these; nothing here performs
//! I/O apart from sleeping between attempts.
//!
//! # Examples
//!
//! ```rust
//! use fieldops_core::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), fieldops_core::Error> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(3)
//!     .base_delay(Duration::from_millis(100))
//!     .jitter(Jitter::Equal)
//!     .build();
//!
//! let mut ctx = AttemptContext::new();
//! let value = RetryExecutor::new(&policy)
//!     .run(&mut ctx, |_| async { Ok::<_, Error>(42) })
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

pub mod circuit;
pub mod clock;
pub mod error;
pub mod retry;

pub use circuit::{BreakerConfig, BreakerSnapshot, CircuitBreaker, CircuitState, Permit};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BoxError, Error, ErrorKind, FailureSignal, Result, TimeoutPhase, classify};
pub use retry::{AttemptContext, Jitter, RetryExecutor, RetryPolicy};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use fieldops_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::circuit::{BreakerConfig, CircuitBreaker, CircuitState, Permit};
    pub use crate::error::{Error, ErrorKind, FailureSignal, TimeoutPhase};
    pub use crate::error_boundary;
    pub use crate::retry::{AttemptContext, Jitter, RetryExecutor, RetryPolicy};
}
