//! Subscriber flow - broker pull loop feeding the pipeline
//!
//! One subscriber drives one broker subscription: pull, filter empty
//! batches, send downstream. Pull failures are swallowed as empty
//! results; the loop never dies on a broker hiccup.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use sluice_config::SubscriberConfig;
use sluice_message::MessageBatch;
use sluice_metrics::{SubscriberMetrics, SubscriberMetricsProvider, SubscriberMetricsSnapshot};

use crate::broker::Puller;
use crate::error::{PipelineError, Result};

/// Pull loop for one broker subscription.
///
/// # Design
///
/// - Batches are emitted downstream in pull order
/// - Empty pulls are counted but not emitted
/// - Pull errors are logged, counted, and followed by a short backoff;
///   the loop then continues as if the pull were empty
/// - The blocking downstream send is the subscriber's backpressure
/// - Cancellation is cooperative: checked once per iteration, so an
///   in-flight pull finishes and its batch is emitted first
pub struct Subscriber {
    name: String,
    config: SubscriberConfig,
    puller: Arc<dyn Puller>,
    metrics: Arc<SubscriberMetrics>,
    cancel: CancellationToken,
}

impl Subscriber {
    pub fn new(
        name: impl Into<String>,
        config: SubscriberConfig,
        puller: Arc<dyn Puller>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineError::BlankName {
                component: "subscriber",
            });
        }

        Ok(Self {
            name,
            config,
            puller,
            metrics: Arc::new(SubscriberMetrics::new()),
            cancel,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    /// Handle for the metrics reporter, valid after `run` consumes the
    /// subscriber.
    pub fn metrics_handle(&self) -> SubscriberMetricsHandle {
        SubscriberMetricsHandle {
            name: self.name.clone(),
            topic: self.config.topic.clone(),
            messaging_type: self.config.broker.as_str(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Pull until cancelled or the downstream channel closes.
    pub async fn run(self, tx: mpsc::Sender<MessageBatch>) {
        info!(
            subscriber = %self.name,
            topic = %self.config.topic,
            broker = %self.config.broker,
            "subscriber starting"
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let start = Instant::now();
            let envelopes = match self.puller.pull().await {
                Ok(envelopes) => {
                    self.metrics.record_pull(start.elapsed(), envelopes.len() as u64);
                    envelopes
                }
                Err(error) => {
                    self.metrics.record_pull_failure(start.elapsed());
                    warn!(
                        subscriber = %self.name,
                        topic = %self.config.topic,
                        error = %error,
                        "pull failed, treating as empty batch"
                    );
                    self.backoff().await;
                    continue;
                }
            };

            if envelopes.is_empty() {
                continue;
            }

            let batch = MessageBatch::new(self.config.topic.clone(), envelopes);

            let send_start = Instant::now();
            match tx.send(batch).await {
                Ok(()) => self.metrics.record_send(send_start.elapsed()),
                Err(_) => {
                    self.metrics.record_send_failure();
                    warn!(
                        subscriber = %self.name,
                        topic = %self.config.topic,
                        "downstream channel closed, stopping"
                    );
                    break;
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            subscriber = %self.name,
            topic = %self.config.topic,
            pulls = snapshot.pulls,
            messages = snapshot.messages_pulled,
            batches = snapshot.batches_sent,
            pull_failures = snapshot.pull_failures,
            "subscriber stopping"
        );
    }

    /// Pause after a failed pull, waking early on cancellation.
    async fn backoff(&self) {
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(self.config.error_backoff) => {}
        }
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("name", &self.name)
            .field("topic", &self.config.topic)
            .field("broker", &self.config.broker)
            .finish()
    }
}

/// Metrics handle for a subscriber.
#[derive(Clone)]
pub struct SubscriberMetricsHandle {
    name: String,
    topic: String,
    messaging_type: &'static str,
    metrics: Arc<SubscriberMetrics>,
}

impl SubscriberMetricsProvider for SubscriberMetricsHandle {
    fn subscriber_name(&self) -> &str {
        &self.name
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn messaging_type(&self) -> &str {
        self.messaging_type
    }

    fn snapshot(&self) -> SubscriberMetricsSnapshot {
        self.metrics.snapshot()
    }
}
