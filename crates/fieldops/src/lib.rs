//! # fieldops
//!
//! Rust client for a field-service management REST API:
//! - Work orders, jobs, technicians, customers and the rest of the endpoint
//!   surface all funnel through one call path, [`Client::execute`]
//! - Failures classified into a closed set of [`ErrorKind`]s
//! - Automatic retries with exponential backoff, jitter and `Retry-After`
//! - A circuit breaker that stops calling an unhealthy server
//! - API-key or bearer authentication through a pluggable header provider
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fieldops::{Client, RequestDescriptor};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder()
//!         .api_key("your-api-key")
//!         .base_url("https://fsm.example.com/api/v2/")
//!         .build()?;
//!
//!     let response = client
//!         .execute(
//!             RequestDescriptor::get("work-orders")
//!                 .query("status", "open")
//!                 .deadline(Duration::from_secs(20)),
//!             None,
//!         )
//!         .await?;
//!
//!     let orders: serde_json::Value = response.json()?;
//!     println!("{orders}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use auth::{Credentials, HeaderProvider, StaticHeaders};
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{RequestDescriptor, Response};

// Module declarations
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;

// Execution-layer types callers match on or configure
pub use fieldops_core::{
    BreakerConfig, BreakerSnapshot, CircuitState, ErrorKind, Jitter, RetryPolicy, TimeoutPhase,
};
pub use fieldops_transport::{HttpRequest, HttpResponse, Transport, TransportError};

// Re-export key dependencies for convenience
pub use async_trait::async_trait;

/// Prelude module for convenient imports.
///
/// ```rust
/// use fieldops::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BreakerConfig, Client, ClientConfig, Error, ErrorKind, Jitter, RequestDescriptor,
        Response, Result, RetryPolicy,
    };
}

/// Version of the fieldops client.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
