//! Circuit breaker.
//!
//! A three-state machine shared by every call through one client:
//!
//! ```text
//!            threshold reached               trial failed
//!   Closed ─────────────────────► Open ◄───────────────── HalfOpen
//!     ▲                            │                          │
//!     │                            │ open_duration elapsed    │
//!     │                            └─────────────────────────►│
//!     └────────────────────────── trial succeeded ────────────┘
//! ```
//!
//! Admission hands out a [`Permit`]; settling the permit is the only way to
//! change state after admission.

mod breaker;
mod config;

pub use breaker::{BreakerSnapshot, CircuitBreaker, Permit};
pub use config::{BreakerConfig, BreakerConfigBuilder};

use serde::Serialize;
use std::fmt;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls flow normally.
    Closed,
    /// Calls are vetoed until the cool-down elapses.
    Open,
    /// A single trial call is probing the remote side.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}
