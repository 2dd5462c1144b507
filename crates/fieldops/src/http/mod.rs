//! Request description, responses and the fault-tolerant call path
//!
//! Endpoint methods describe what they want with a [`RequestDescriptor`] and
//! hand it to [`Client::execute`](crate::Client::execute), which resolves it
//! against the base URL and runs it under the client's breaker and retry
//! policy.

pub use request::RequestDescriptor;
pub use response::Response;

pub(crate) mod executor;
mod request;
mod response;

// Re-export HTTP types from the http crate for convenience
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
