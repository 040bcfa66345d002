//! Unified metrics reporter
//!
//! Collects metrics from all components and reports them periodically.
//!
//! # Overview
//!
//! The `UnifiedReporter` aggregates metrics from:
//! - Queues (enqueue/dequeue counts, depth)
//! - Subscribers (pulls, emitted batches)
//! - Protected tasks (outcomes, retries, rejections)
//! - Processors (processed messages, acknowledgements)
//!
//! It runs as an async task, collecting snapshots at the configured
//! interval and emitting formatted output via tracing.

use std::sync::Arc;

use sluice_config::{MetricsConfig, MetricsFormat};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    format::MetricsFormatter, CollectedMetrics, CollectedProcessor, CollectedQueue,
    CollectedSubscriber, CollectedTask, HumanFormatter, JsonFormatter, ProcessorMetricsProvider,
    QueueMetricsProvider, SubscriberMetricsProvider, TaskMetricsProvider,
};

/// Builder for constructing a UnifiedReporter
#[derive(Default)]
pub struct UnifiedReporterBuilder {
    config: Option<MetricsConfig>,
    queues: Vec<Arc<dyn QueueMetricsProvider>>,
    subscribers: Vec<Arc<dyn SubscriberMetricsProvider>>,
    tasks: Vec<Arc<dyn TaskMetricsProvider>>,
    processors: Vec<Arc<dyn ProcessorMetricsProvider>>,
}

impl UnifiedReporterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metrics configuration
    pub fn config(mut self, config: MetricsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Register a queue metrics provider
    pub fn queue(mut self, provider: Arc<dyn QueueMetricsProvider>) -> Self {
        self.queues.push(provider);
        self
    }

    /// Register multiple queue metrics providers
    pub fn queues(mut self, providers: Vec<Arc<dyn QueueMetricsProvider>>) -> Self {
        self.queues.extend(providers);
        self
    }

    /// Register a subscriber metrics provider
    pub fn subscriber(mut self, provider: Arc<dyn SubscriberMetricsProvider>) -> Self {
        self.subscribers.push(provider);
        self
    }

    /// Register multiple subscriber metrics providers
    pub fn subscribers(mut self, providers: Vec<Arc<dyn SubscriberMetricsProvider>>) -> Self {
        self.subscribers.extend(providers);
        self
    }

    /// Register a task metrics provider
    pub fn task(mut self, provider: Arc<dyn TaskMetricsProvider>) -> Self {
        self.tasks.push(provider);
        self
    }

    /// Register multiple task metrics providers
    pub fn tasks(mut self, providers: Vec<Arc<dyn TaskMetricsProvider>>) -> Self {
        self.tasks.extend(providers);
        self
    }

    /// Register a processor metrics provider
    pub fn processor(mut self, provider: Arc<dyn ProcessorMetricsProvider>) -> Self {
        self.processors.push(provider);
        self
    }

    /// Register multiple processor metrics providers
    pub fn processors(mut self, providers: Vec<Arc<dyn ProcessorMetricsProvider>>) -> Self {
        self.processors.extend(providers);
        self
    }

    /// Build the UnifiedReporter
    pub fn build(self) -> UnifiedReporter {
        let config = self.config.unwrap_or_default();
        let formatter: Box<dyn MetricsFormatter> = match config.format {
            MetricsFormat::Human => Box::new(HumanFormatter::new()),
            MetricsFormat::Json => Box::new(JsonFormatter::new()),
        };

        UnifiedReporter {
            config,
            formatter,
            queues: self.queues,
            subscribers: self.subscribers,
            tasks: self.tasks,
            processors: self.processors,
            previous: None,
        }
    }
}

/// Unified metrics reporter
///
/// Collects and reports metrics from all components at a configured interval.
pub struct UnifiedReporter {
    config: MetricsConfig,
    formatter: Box<dyn MetricsFormatter>,
    queues: Vec<Arc<dyn QueueMetricsProvider>>,
    subscribers: Vec<Arc<dyn SubscriberMetricsProvider>>,
    tasks: Vec<Arc<dyn TaskMetricsProvider>>,
    processors: Vec<Arc<dyn ProcessorMetricsProvider>>,
    previous: Option<CollectedMetrics>,
}

impl UnifiedReporter {
    /// Create a new builder
    pub fn builder() -> UnifiedReporterBuilder {
        UnifiedReporterBuilder::new()
    }

    /// Run the reporter until cancellation
    ///
    /// This is the main entry point - spawn this as a tokio task.
    pub async fn run(mut self, cancel: CancellationToken) {
        if !self.config.enabled {
            info!("metrics reporting disabled");
            return;
        }

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            interval_secs = self.config.interval.as_secs(),
            format = ?self.config.format,
            "metrics reporter started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("metrics reporter shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }

    /// Collect and report metrics once
    fn report(&mut self) {
        let metrics = self.collect();
        let rates = self.previous.as_ref().and_then(|prev| metrics.rates(prev));

        let output = self.formatter.format_unified(&metrics, rates.as_ref());

        // Log each line separately for human format (multiple lines)
        for line in output.lines() {
            info!("{}", line);
        }

        self.previous = Some(metrics);
    }

    /// Collect metrics from all registered providers
    fn collect(&self) -> CollectedMetrics {
        let mut metrics = CollectedMetrics::new();

        if self.config.include_queues {
            metrics.queues = self
                .queues
                .iter()
                .map(|q| CollectedQueue {
                    name: q.queue_name().to_string(),
                    snapshot: q.snapshot(),
                })
                .collect();
        }

        if self.config.include_subscribers {
            metrics.subscribers = self
                .subscribers
                .iter()
                .map(|s| CollectedSubscriber {
                    name: s.subscriber_name().to_string(),
                    topic: s.topic().to_string(),
                    messaging_type: s.messaging_type().to_string(),
                    snapshot: s.snapshot(),
                })
                .collect();
        }

        if self.config.include_tasks {
            metrics.tasks = self
                .tasks
                .iter()
                .map(|t| CollectedTask {
                    name: t.task_name().to_string(),
                    snapshot: t.snapshot(),
                })
                .collect();
        }

        if self.config.include_processors {
            metrics.processors = self
                .processors
                .iter()
                .map(|p| CollectedProcessor {
                    name: p.processor_name().to_string(),
                    topic: p.topic().to_string(),
                    snapshot: p.snapshot(),
                })
                .collect();
        }

        metrics
    }
}
