//! Transport abstraction layer for the fieldops client
//!
//! Provides a trait-based transport abstraction so the fault-tolerant call
//! wrapper never talks to an HTTP library directly. Tests substitute scripted
//! transports; production uses the reqwest-backed [`HttpTransport`].
//!
//! # Architecture
//!
//! - **Transport trait**: one request in, one response or error out
//! - **HTTP transport**: REST client via reqwest with pooled connections
//! - **Error handling**: [`TransportError`] converts into the core
//!   [`FailureSignal`](fieldops_core::FailureSignal) for classification
//!
//! # Usage
//!
//! ```no_run
//! use fieldops_transport::{HttpRequest, HttpTransport, Transport};
//! use http::Method;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new()?;
//! let url = Url::parse("https://api.example.com/v2/jobs/42")?;
//! let response = transport.send(HttpRequest::new(Method::GET, url)).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use http::{HttpTransport, HttpTransportConfig};
pub use traits::{HttpRequest, HttpResponse, Transport};
