//! Main client implementation for the fieldops API

use std::sync::Arc;
use std::time::Duration;

use fieldops_core::{
    BreakerConfig, BreakerSnapshot, CircuitBreaker, CircuitState, Clock, RetryPolicy,
};
use fieldops_transport::{HttpTransport, HttpTransportConfig, Transport};
use secrecy::SecretString;
use url::Url;

use crate::{
    auth::{Credentials, HeaderProvider, StaticHeaders},
    config::ClientConfig,
    error::{Error, Result},
    http::{RequestDescriptor, Response, executor::Dispatcher},
};

/// Main client for the field-service management API.
///
/// Every call goes through one circuit breaker shared by all clones of the
/// client, and is retried according to the client's [`RetryPolicy`] unless
/// the call supplies its own.
///
/// # Example
///
/// ```rust,no_run
/// use fieldops::{Client, RequestDescriptor};
///
/// # async fn example() -> fieldops::Result<()> {
/// let client = Client::builder()
///     .api_key("fo_live_...")
///     .base_url("https://fsm.example.com/api/v2/")
///     .build()?;
///
/// let response = client
///     .execute(RequestDescriptor::get("work-orders").query("status", "open"), None)
///     .await?;
/// let orders: serde_json::Value = response.json()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Dispatcher>,
}

impl Client {
    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from a configuration object.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or invalid, no credentials
    /// are configured, or the HTTP client cannot be built.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        ClientBuilder::from(config).build()
    }

    /// Load configuration from `FIELDOPS_*` environment variables and build.
    ///
    /// # Errors
    ///
    /// See [`Client::from_config`].
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Run one logical call under the breaker and retry policy.
    ///
    /// `policy` replaces the client's retry policy for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Call`] carrying the failure's kind. A call vetoed by
    /// an open circuit fails with `CircuitOpen` without touching the network.
    pub async fn execute(
        &self,
        request: RequestDescriptor,
        policy: Option<&RetryPolicy>,
    ) -> Result<Response> {
        self.inner.execute(&request, policy).await
    }

    /// `GET` a path with the client's defaults.
    pub async fn get(&self, path: impl Into<String>) -> Result<Response> {
        self.execute(RequestDescriptor::get(path), None).await
    }

    /// Current breaker state.
    pub fn circuit_state(&self) -> CircuitState {
        self.inner.breaker.state()
    }

    /// Breaker counters, for health endpoints and dashboards.
    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.inner.breaker.snapshot()
    }

    /// The default retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.policy
    }

    /// Base URL request paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }
}

/// Builder for creating a configured [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    header_provider: Option<Arc<dyn HeaderProvider>>,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl From<ClientConfig> for ClientBuilder {
    fn from(config: ClientConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }
}

impl ClientBuilder {
    /// Set the API key for authentication.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(api_key.into().into_boxed_str()));
        self
    }

    /// Set a bearer token for authentication (alternative to API key).
    pub fn auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.config.auth_token = Some(SecretString::new(auth_token.into().into_boxed_str()));
        self
    }

    /// Set the base URL for the API.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the default retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set the circuit breaker configuration.
    pub fn breaker(mut self, config: BreakerConfig) -> Self {
        self.config.breaker = config;
        self
    }

    /// Add a custom default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: http::HeaderName = key_str
            .parse()
            .map_err(|_| Error::InvalidHeaderName(key_str.clone()))?;
        let value: http::HeaderValue = value_str
            .parse()
            .map_err(|_| Error::InvalidHeaderValue(value_str.clone()))?;

        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Supply headers from a custom provider instead of the configured
    /// credentials and default headers.
    pub fn header_provider(mut self, provider: impl HeaderProvider + 'static) -> Self {
        self.header_provider = Some(Arc::new(provider));
        self
    }

    /// Send requests through a custom transport instead of the built-in
    /// reqwest one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Time source for the circuit breaker's cool-down.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the client with the configured options.
    ///
    /// # Errors
    ///
    /// See [`Client::from_config`].
    pub fn build(self) -> Result<Client> {
        let ClientBuilder {
            config,
            header_provider,
            transport,
            clock,
        } = self;

        let base_url = parse_base_url(config.base_url.as_deref())?;

        let headers: Arc<dyn HeaderProvider> = match header_provider {
            Some(provider) => provider,
            None => {
                let credentials = match (config.api_key, config.auth_token) {
                    (Some(key), _) => Credentials::ApiKey(key),
                    (None, Some(token)) => Credentials::Bearer(token),
                    (None, None) => {
                        return Err(Error::MissingConfig(
                            "credentials (api key or auth token)".into(),
                        ));
                    }
                };
                Arc::new(StaticHeaders::new(Some(credentials)).with_defaults(config.default_headers))
            }
        };

        let transport: Arc<dyn Transport> = match transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::with_config(HttpTransportConfig {
                    timeout: config.timeout,
                    connect_timeout: config.connect_timeout,
                    ..Default::default()
                })
                .map_err(|e| Error::HttpClient(e.to_string()))?,
            ),
        };

        let breaker = match clock {
            Some(clock) => CircuitBreaker::with_clock(config.breaker, clock),
            None => CircuitBreaker::new(config.breaker),
        };

        Ok(Client {
            inner: Arc::new(Dispatcher {
                transport,
                headers,
                breaker: Arc::new(breaker),
                base_url,
                timeout: Some(config.timeout),
                policy: config.retry,
            }),
        })
    }
}

fn parse_base_url(raw: Option<&str>) -> Result<Url> {
    let raw = raw.ok_or_else(|| Error::MissingConfig("base URL".into()))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("base URL is empty".into()));
    }

    let url = Url::parse(trimmed).map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!(
            "unsupported scheme '{scheme}' in {trimmed}; expected http or https"
        ))),
    }
}
