//! Sluice Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use sluice_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[retries.payments]\nmax_attempts = 5").unwrap();
//! assert!(config.retry("payments").is_some());
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [metrics]
//! interval = "60s"
//!
//! [queues.audit]
//! capacity = 128
//!
//! [subscribers.orders]
//! topic = "orders-v1"
//! broker = "kafka"
//!
//! [retries.payments]
//! max_attempts = 3
//! base_delay = "200ms"
//!
//! [breakers.payments]
//! failure_threshold = 5
//! cooldown = "30s"
//!
//! [pools.payments]
//! workers = 8
//! ```

mod error;
mod logging;
mod metrics;
mod pipeline;
mod policies;
mod validation;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use metrics::{MetricsConfig, MetricsFormat};
pub use pipeline::{QueueConfig, SubscriberConfig};
pub use policies::{BreakerConfig, PoolConfig, RetryConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults. Named sections
/// (queues, subscribers, policies) use the section key as the lookup name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Metrics reporting configuration
    pub metrics: MetricsConfig,

    /// Bounded queues by name
    pub queues: BTreeMap<String, QueueConfig>,

    /// Subscribers by name
    pub subscribers: BTreeMap<String, SubscriberConfig>,

    /// Retry policies by name
    pub retries: BTreeMap<String, RetryConfig>,

    /// Circuit breakers by name
    pub breakers: BTreeMap<String, BreakerConfig>,

    /// Worker pools by name
    pub pools: BTreeMap<String, PoolConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Retry policy section for a name, if configured.
    pub fn retry(&self, name: &str) -> Option<&RetryConfig> {
        self.retries.get(name)
    }

    /// Circuit breaker section for a name, if configured.
    pub fn breaker(&self, name: &str) -> Option<&BreakerConfig> {
        self.breakers.get(name)
    }

    /// Worker pool section for a name, if configured.
    pub fn pool(&self, name: &str) -> Option<&PoolConfig> {
        self.pools.get(name)
    }

    /// Queue section for a name, if configured.
    pub fn queue(&self, name: &str) -> Option<&QueueConfig> {
        self.queues.get(name)
    }

    /// Subscriber section for a name, if configured.
    pub fn subscriber(&self, name: &str) -> Option<&SubscriberConfig> {
        self.subscribers.get(name)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
