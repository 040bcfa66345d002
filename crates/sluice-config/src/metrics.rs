//! Metrics reporting configuration

use serde::Deserialize;
use std::time::Duration;

/// Metrics output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON structured output
    Json,
}

/// Metrics configuration
///
/// # Example
///
/// ```toml
/// [metrics]
/// # All fields optional - defaults to enabled with human format
/// enabled = true
/// interval = "60s"
/// format = "human"
/// include_queues = true
/// include_subscribers = true
/// include_tasks = true
/// include_processors = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable metrics reporting
    /// Default: true
    pub enabled: bool,

    /// Reporting interval
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Output format (human, json)
    /// Default: human
    pub format: MetricsFormat,

    /// Include queue metrics (enqueue/dequeue counts, wait times)
    /// Default: true
    pub include_queues: bool,

    /// Include subscriber metrics (pulls, emitted batches)
    /// Default: true
    pub include_subscribers: bool,

    /// Include protected task metrics (executions, retries, rejections)
    /// Default: true
    pub include_tasks: bool,

    /// Include processor metrics (processed messages, acknowledgements)
    /// Default: true
    pub include_processors: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            format: MetricsFormat::Human,
            include_queues: true,
            include_subscribers: true,
            include_tasks: true,
            include_processors: true,
        }
    }
}
