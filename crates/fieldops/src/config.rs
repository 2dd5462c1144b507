//! Configuration for the fieldops client

use fieldops_core::{BreakerConfig, RetryPolicy};
use http::HeaderMap;
use secrecy::SecretString;
use std::time::Duration;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the fieldops client.
///
/// Plain data; pass it to [`Client::from_config`](crate::Client::from_config)
/// or use [`Client::builder`](crate::Client::builder) directly.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key, sent as `x-api-key` (preferred method)
    pub api_key: Option<SecretString>,

    /// Bearer token (alternative to API key)
    pub auth_token: Option<SecretString>,

    /// Base URL every request path is resolved against
    pub base_url: Option<String>,

    /// Per-attempt timeout
    pub timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,

    /// Retry policy applied to every call unless overridden
    pub retry: RetryPolicy,

    /// Circuit breaker settings
    pub breaker: BreakerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            auth_token: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            default_headers: HeaderMap::new(),
            retry: RetryPolicy::default(),
            breaker: BreakerConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with an API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            ..Default::default()
        }
    }

    /// Create a new configuration with a bearer token.
    pub fn with_auth_token(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: Some(SecretString::new(auth_token.into().into_boxed_str())),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// This will look for:
    /// - `FIELDOPS_API_KEY` or `FIELDOPS_AUTH_TOKEN` for authentication
    /// - `FIELDOPS_BASE_URL` for the API base URL
    /// - `FIELDOPS_TIMEOUT` for the per-attempt timeout (in seconds)
    /// - `FIELDOPS_MAX_ATTEMPTS` for total attempts per call
    /// - `FIELDOPS_BREAKER_THRESHOLD` for consecutive failures that open the circuit
    /// - `FIELDOPS_BREAKER_OPEN_SECS` for how long the circuit stays open
    ///
    /// Numeric variables that fail to parse are ignored with a warning.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::Error> {
        use std::env;
        use tracing::warn;

        fn number<T: std::str::FromStr>(name: &str) -> Option<T> {
            let raw = env::var(name).ok()?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(variable = name, value = %raw, "Ignoring unparsable setting");
                    None
                }
            }
        }

        dotenvy::dotenv().ok();

        let mut config = Self::default();

        // Authentication
        if let Ok(api_key) = env::var("FIELDOPS_API_KEY") {
            config.api_key = Some(SecretString::new(api_key.into_boxed_str()));
        } else if let Ok(auth_token) = env::var("FIELDOPS_AUTH_TOKEN") {
            config.auth_token = Some(SecretString::new(auth_token.into_boxed_str()));
        }

        if let Ok(base_url) = env::var("FIELDOPS_BASE_URL") {
            config.base_url = Some(base_url);
        }

        if let Some(timeout_secs) = number::<u64>("FIELDOPS_TIMEOUT") {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        if let Some(max_attempts) = number::<u32>("FIELDOPS_MAX_ATTEMPTS") {
            config.retry = config.retry.to_builder().max_attempts(max_attempts).build();
        }

        if let Some(threshold) = number::<u32>("FIELDOPS_BREAKER_THRESHOLD") {
            config.breaker = config.breaker.to_builder().failure_threshold(threshold).build();
        }

        if let Some(open_secs) = number::<u64>("FIELDOPS_BREAKER_OPEN_SECS") {
            config.breaker = config
                .breaker
                .to_builder()
                .open_duration(Duration::from_secs(open_secs))
                .build();
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence.
    ///
    /// Fields of `other` still at their default value do not override.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.auth_token.is_some() {
            self.auth_token = other.auth_token;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.timeout != DEFAULT_TIMEOUT {
            self.timeout = other.timeout;
        }
        if other.connect_timeout != DEFAULT_CONNECT_TIMEOUT {
            self.connect_timeout = other.connect_timeout;
        }
        for (key, value) in other.default_headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }
        if other.retry != RetryPolicy::default() {
            self.retry = other.retry;
        }
        if other.breaker != BreakerConfig::default() {
            self.breaker = other.breaker;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.retry.max_attempts(), 3);
        assert_eq!(config.breaker.failure_threshold(), 5);
        assert!(config.api_key.is_none());
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_config_with_api_key() {
        let config = ClientConfig::with_api_key("test-key");
        assert_eq!(config.api_key.unwrap().expose_secret(), "test-key");
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_config_merge() {
        let config1 = ClientConfig::with_api_key("key1");
        let config2 = ClientConfig {
            base_url: Some("https://fsm.example.com/api/".into()),
            timeout: Duration::from_secs(30),
            breaker: BreakerConfig::builder().failure_threshold(2).build(),
            ..Default::default()
        };

        let merged = config1.merge(config2);
        assert!(merged.api_key.is_some());
        assert_eq!(merged.base_url.as_deref(), Some("https://fsm.example.com/api/"));
        assert_eq!(merged.timeout, Duration::from_secs(30));
        assert_eq!(merged.breaker.failure_threshold(), 2);
        assert_eq!(merged.retry, RetryPolicy::default());
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("FIELDOPS_API_KEY", Some("env-key")),
                ("FIELDOPS_AUTH_TOKEN", None),
                ("FIELDOPS_BASE_URL", Some("https://fsm.example.com/api/")),
                ("FIELDOPS_TIMEOUT", Some("15")),
                ("FIELDOPS_MAX_ATTEMPTS", Some("5")),
                ("FIELDOPS_BREAKER_THRESHOLD", Some("3")),
                ("FIELDOPS_BREAKER_OPEN_SECS", Some("45")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.api_key.unwrap().expose_secret(), "env-key");
                assert_eq!(config.base_url.as_deref(), Some("https://fsm.example.com/api/"));
                assert_eq!(config.timeout, Duration::from_secs(15));
                assert_eq!(config.retry.max_attempts(), 5);
                assert_eq!(config.breaker.failure_threshold(), 3);
                assert_eq!(config.breaker.open_duration(), Duration::from_secs(45));
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_from_env_bearer_and_bad_numbers() {
        temp_env::with_vars(
            [
                ("FIELDOPS_API_KEY", None),
                ("FIELDOPS_AUTH_TOKEN", Some("env-token")),
                ("FIELDOPS_BASE_URL", None),
                ("FIELDOPS_TIMEOUT", Some("soon")),
                ("FIELDOPS_MAX_ATTEMPTS", Some("-1")),
                ("FIELDOPS_BREAKER_THRESHOLD", None),
                ("FIELDOPS_BREAKER_OPEN_SECS", None),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert!(config.api_key.is_none());
                assert_eq!(config.auth_token.unwrap().expose_secret(), "env-token");
                assert!(config.base_url.is_none());
                assert_eq!(config.timeout, DEFAULT_TIMEOUT);
                assert_eq!(config.retry.max_attempts(), 3);
            },
        );
    }
}
