//! Queue and subscriber configuration

use serde::Deserialize;
use sluice_message::BrokerKind;
use std::time::Duration;

/// Bounded queue configuration
///
/// # Example
///
/// ```toml
/// [queues.audit]
/// capacity = 128
/// ```
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum batches buffered before producers block
    /// Default: 64
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// Subscriber configuration
///
/// # Example
///
/// ```toml
/// [subscribers.orders]
/// topic = "orders-v1"
/// broker = "kafka"
/// queue = "audit"
/// inject_trace = true
/// error_backoff = "1s"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubscriberConfig {
    /// Topic (or queue / subscription) to consume
    pub topic: String,

    /// Broker family; labels metrics and logs
    /// Default: kafka
    pub broker: BrokerKind,

    /// Optional named queue to stage batches in before processing
    pub queue: Option<String>,

    /// Derive trace context from message attributes during processing
    /// Default: true
    pub inject_trace: bool,

    /// Pause after a failed pull before trying again
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub error_backoff: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            topic: String::new(),
            broker: BrokerKind::Kafka,
            queue: None,
            inject_trace: true,
            error_backoff: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.capacity, 64);
    }

    #[test]
    fn test_subscriber_deserialize() {
        let config: SubscriberConfig = toml::from_str(
            r#"
topic = "orders-v1"
broker = "aws_sqs"
queue = "staging"
inject_trace = false
error_backoff = "250ms"
"#,
        )
        .unwrap();

        assert_eq!(config.topic, "orders-v1");
        assert_eq!(config.broker, BrokerKind::AwsSqs);
        assert_eq!(config.queue.as_deref(), Some("staging"));
        assert!(!config.inject_trace);
        assert_eq!(config.error_backoff, Duration::from_millis(250));
    }

    #[test]
    fn test_subscriber_defaults() {
        let config: SubscriberConfig = toml::from_str(r#"topic = "t""#).unwrap();
        assert_eq!(config.broker, BrokerKind::Kafka);
        assert!(config.queue.is_none());
        assert!(config.inject_trace);
        assert_eq!(config.error_backoff, Duration::from_secs(1));
    }
}
