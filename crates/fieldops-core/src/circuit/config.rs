use crate::ErrorKind;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
const DEFAULT_OPEN_DURATION: Duration = Duration::from_secs(30);

/// Circuit breaker configuration.
///
/// ```rust
/// use fieldops_core::BreakerConfig;
/// use std::time::Duration;
///
/// let config = BreakerConfig::builder()
///     .failure_threshold(3)
///     .open_duration(Duration::from_secs(10))
///     .build();
/// assert_eq!(config.failure_threshold(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawBreakerConfig")]
pub struct BreakerConfig {
    failure_threshold: u32,
    open_duration: Duration,
    countable: HashSet<ErrorKind>,
}

impl BreakerConfig {
    /// Start building from the defaults.
    pub fn builder() -> BreakerConfigBuilder {
        BreakerConfigBuilder::default()
    }

    /// A builder pre-filled with this configuration.
    pub fn to_builder(&self) -> BreakerConfigBuilder {
        BreakerConfigBuilder {
            failure_threshold: Some(self.failure_threshold),
            open_duration: Some(self.open_duration),
            countable: Some(self.countable.clone()),
        }
    }

    /// Consecutive countable failures that open the circuit.
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// How long the circuit stays open before admitting a trial.
    pub fn open_duration(&self) -> Duration {
        self.open_duration
    }

    /// Whether a failure of `kind` counts toward opening the circuit.
    pub fn is_countable(&self, kind: ErrorKind) -> bool {
        self.countable.contains(&kind)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfigBuilder::default().build()
    }
}

/// Builder for [`BreakerConfig`].
#[derive(Debug, Default, Clone)]
pub struct BreakerConfigBuilder {
    failure_threshold: Option<u32>,
    open_duration: Option<Duration>,
    countable: Option<HashSet<ErrorKind>>,
}

impl BreakerConfigBuilder {
    /// Default: 5. Clamped to at least 1.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = Some(threshold);
        self
    }

    /// Default: 30s.
    pub fn open_duration(mut self, duration: Duration) -> Self {
        self.open_duration = Some(duration);
        self
    }

    /// Replace the set of kinds that count as failures.
    ///
    /// Default: transport, timeout, server fault and rate limited.
    pub fn countable(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.countable = Some(kinds.into_iter().collect());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self
                .failure_threshold
                .unwrap_or(DEFAULT_FAILURE_THRESHOLD)
                .max(1),
            open_duration: self.open_duration.unwrap_or(DEFAULT_OPEN_DURATION),
            countable: self
                .countable
                .unwrap_or_else(|| ErrorKind::TRANSIENT.into_iter().collect()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawBreakerConfig {
    failure_threshold: Option<u32>,
    open_duration_ms: Option<u64>,
    countable: Option<Vec<ErrorKind>>,
}

impl From<RawBreakerConfig> for BreakerConfig {
    fn from(raw: RawBreakerConfig) -> Self {
        BreakerConfigBuilder {
            failure_threshold: raw.failure_threshold,
            open_duration: raw.open_duration_ms.map(Duration::from_millis),
            countable: raw.countable.map(|kinds| kinds.into_iter().collect()),
        }
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BreakerConfig::default();
        assert_eq!(config.failure_threshold(), 5);
        assert_eq!(config.open_duration(), Duration::from_secs(30));
        assert!(config.is_countable(ErrorKind::Timeout));
        assert!(!config.is_countable(ErrorKind::ClientFault));
        assert!(!config.is_countable(ErrorKind::Authentication));
    }

    #[test]
    fn test_zero_threshold_clamped() {
        let config = BreakerConfig::builder().failure_threshold(0).build();
        assert_eq!(config.failure_threshold(), 1);
    }

    #[test]
    fn test_to_builder_overrides_one_field() {
        let config = BreakerConfig::builder()
            .countable([ErrorKind::ServerFault])
            .build()
            .to_builder()
            .open_duration(Duration::from_secs(5))
            .build();

        assert_eq!(config.open_duration(), Duration::from_secs(5));
        assert_eq!(config.failure_threshold(), 5);
        assert!(!config.is_countable(ErrorKind::Timeout));
    }

    #[test]
    fn test_deserialize() {
        let config: BreakerConfig = toml::from_str(
            r#"
            failure_threshold = 2
            open_duration_ms = 1500
            countable = ["server_fault"]
            "#,
        )
        .unwrap();

        assert_eq!(config.failure_threshold(), 2);
        assert_eq!(config.open_duration(), Duration::from_millis(1500));
        assert!(config.is_countable(ErrorKind::ServerFault));
        assert!(!config.is_countable(ErrorKind::Timeout));
    }
}
