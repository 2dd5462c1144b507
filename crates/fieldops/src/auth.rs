//! Request authentication
//!
//! The client asks a [`HeaderProvider`] for headers before every attempt, so a
//! provider that refreshes credentials in the background is picked up on the
//! next retry without rebuilding the client.

use fieldops_core::Error as CallError;
use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Header name used for API-key authentication.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Supplies the headers attached to every outbound attempt.
///
/// A failure here surfaces as an `Authentication` error and ends the call.
pub trait HeaderProvider: Send + Sync + fmt::Debug {
    /// Headers for the next attempt.
    fn headers(&self) -> fieldops_core::Result<HeaderMap>;
}

/// Credentials sent with every request.
#[derive(Clone)]
pub enum Credentials {
    /// Sent as `x-api-key`.
    ApiKey(SecretString),
    /// Sent as `Authorization: Bearer ...`.
    Bearer(SecretString),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey([REDACTED])"),
            Credentials::Bearer(_) => f.write_str("Bearer([REDACTED])"),
        }
    }
}

/// Fixed credentials plus default headers.
///
/// # Example
///
/// ```rust
/// use fieldops::auth::{HeaderProvider, StaticHeaders};
///
/// let provider = StaticHeaders::api_key("fo_live_123");
/// let headers = provider.headers().unwrap();
/// assert!(headers.get("x-api-key").unwrap().is_sensitive());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders {
    credentials: Option<Credentials>,
    defaults: HeaderMap,
}

impl StaticHeaders {
    /// Authenticate with an API key.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::new(Some(Credentials::ApiKey(SecretString::new(
            key.into().into_boxed_str(),
        ))))
    }

    /// Authenticate with a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(Some(Credentials::Bearer(SecretString::new(
            token.into().into_boxed_str(),
        ))))
    }

    /// Create a provider from optional credentials.
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials,
            defaults: HeaderMap::new(),
        }
    }

    /// Add headers sent with every request.
    pub fn with_defaults(mut self, headers: HeaderMap) -> Self {
        self.defaults.extend(headers);
        self
    }

    fn credential_header(&self) -> fieldops_core::Result<Option<(HeaderName, HeaderValue)>> {
        let (name, raw) = match &self.credentials {
            None => return Ok(None),
            Some(Credentials::ApiKey(key)) => (API_KEY_HEADER, key.expose_secret().to_string()),
            Some(Credentials::Bearer(token)) => {
                (AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            }
        };

        let mut value = HeaderValue::try_from(raw).map_err(|_| {
            CallError::credentials(format!("credential for {name} is not a valid header value"))
        })?;
        value.set_sensitive(true);
        Ok(Some((name, value)))
    }
}

impl HeaderProvider for StaticHeaders {
    fn headers(&self) -> fieldops_core::Result<HeaderMap> {
        let mut headers = self.defaults.clone();
        if let Some((name, value)) = self.credential_header()? {
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

/// A [`HeaderProvider`] backed by a closure.
///
/// Built with [`from_fn`].
#[derive(Clone)]
pub struct FnHeaders<F>(F);

/// Wrap a closure as a [`HeaderProvider`].
///
/// ```rust
/// use fieldops::auth::{self, HeaderProvider};
/// use http::{HeaderMap, HeaderValue};
///
/// let provider = auth::from_fn(|| {
///     let mut headers = HeaderMap::new();
///     headers.insert("x-api-key", HeaderValue::from_static("rotated"));
///     Ok(headers)
/// });
/// assert_eq!(provider.headers().unwrap()["x-api-key"], "rotated");
/// ```
pub fn from_fn<F>(f: F) -> FnHeaders<F>
where
    F: Fn() -> fieldops_core::Result<HeaderMap> + Send + Sync,
{
    FnHeaders(f)
}

impl<F> fmt::Debug for FnHeaders<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHeaders")
    }
}

impl<F> HeaderProvider for FnHeaders<F>
where
    F: Fn() -> fieldops_core::Result<HeaderMap> + Send + Sync,
{
    fn headers(&self) -> fieldops_core::Result<HeaderMap> {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldops_core::ErrorKind;
    use http::header::ACCEPT;

    #[test]
    fn test_api_key_header() {
        let headers = StaticHeaders::api_key("secret-key").headers().unwrap();
        let value = &headers[API_KEY_HEADER];
        assert_eq!(value, "secret-key");
        assert!(value.is_sensitive());
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_bearer_header() {
        let headers = StaticHeaders::bearer("tok").headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert!(headers.get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn test_defaults_are_merged() {
        let mut defaults = HeaderMap::new();
        defaults.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let headers = StaticHeaders::api_key("k")
            .with_defaults(defaults)
            .headers()
            .unwrap();
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_invalid_credential_is_authentication_error() {
        let error = StaticHeaders::api_key("line\nbreak").headers().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert_eq!(error.status(), None);
        assert!(!error.message().contains("line"));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let provider = StaticHeaders::bearer("super-secret");
        assert!(!format!("{provider:?}").contains("super-secret"));
    }

    #[test]
    fn test_closure_provider() {
        let provider = from_fn(|| {
            let mut headers = HeaderMap::new();
            headers.insert(API_KEY_HEADER, HeaderValue::from_static("rotating"));
            Ok(headers)
        });
        assert_eq!(provider.headers().unwrap()[API_KEY_HEADER], "rotating");
    }
}
