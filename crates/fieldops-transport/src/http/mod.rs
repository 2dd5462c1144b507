//! HTTP transport implementation
//!
//! Provides a reqwest-backed client that implements the [`Transport`](crate::Transport)
//! trait. Retries, classification and circuit breaking live above this layer.

pub mod client;

pub use client::{HttpTransport, HttpTransportConfig};
