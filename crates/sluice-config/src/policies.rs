//! Protection policy configuration
//!
//! Retry, circuit breaker and worker pool definitions. Each section is a
//! named table; the policy registry materializes instances on first use
//! and returns nothing for names that have no section here.

use serde::Deserialize;
use std::time::Duration;

/// Retry policy configuration
///
/// # Example
///
/// ```toml
/// [retries.payments]
/// max_attempts = 3
/// base_delay = "200ms"
/// max_delay = "30s"
/// jitter = true
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    /// Default: 3
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry
    /// Default: 200ms
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,

    /// Upper bound on any single delay
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// Randomize each delay between half and full value
    /// Default: true
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

/// Circuit breaker configuration
///
/// # Example
///
/// ```toml
/// [breakers.payments]
/// failure_threshold = 5
/// cooldown = "30s"
/// half_open_trials = 1
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens
    /// Default: 5
    pub failure_threshold: u32,

    /// How long the breaker stays open before allowing trial calls
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,

    /// Concurrent trial calls allowed while half-open
    /// Default: 1
    pub half_open_trials: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
            half_open_trials: 1,
        }
    }
}

/// Worker pool configuration
///
/// # Example
///
/// ```toml
/// [pools.payments]
/// workers = 8
/// ```
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum tasks running concurrently in this pool
    /// Default: 4
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_millis(200));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.jitter);
    }

    #[test]
    fn test_retry_deserialize_humantime_delays() {
        let config: RetryConfig = toml::from_str(
            r#"
max_attempts = 5
base_delay = "50ms"
max_delay = "2s"
jitter = false
"#,
        )
        .unwrap();

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_delay, Duration::from_millis(50));
        assert_eq!(config.max_delay, Duration::from_secs(2));
        assert!(!config.jitter);
    }

    #[test]
    fn test_breaker_defaults() {
        let config = BreakerConfig::default();
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.cooldown, Duration::from_secs(30));
        assert_eq!(config.half_open_trials, 1);
    }

    #[test]
    fn test_pool_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.workers, 4);
    }
}
