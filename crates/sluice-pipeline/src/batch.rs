//! Batch processor - whole-batch execution with partial acknowledgement
//!
//! Same shape as the single-message processor but the protected task
//! sees the entire batch, and acknowledgement goes through a
//! [`BatchAcknowledger`] that may confirm only part of it. The
//! confirmed count is recorded faithfully, never rounded to
//! all-or-nothing.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn, Instrument};

use sluice_message::MessageBatch;
use sluice_metrics::ProcessorMetrics;
use sluice_trace::{extract, processing_span, TraceContext};

use crate::broker::BatchAcknowledger;
use crate::error::{PipelineError, Result};
use crate::processor::{BatchStream, ProcessorMetricsHandle};
use crate::task::ProtectedTask;

/// Per-batch consumer: trace context, protected execution, partial ack.
pub struct BatchProcessor {
    name: String,
    topic: String,
    task: ProtectedTask<MessageBatch, MessageBatch>,
    acknowledger: Arc<dyn BatchAcknowledger>,
    metrics: Arc<ProcessorMetrics>,
    inject_trace: bool,
}

impl BatchProcessor {
    pub fn new(
        name: impl Into<String>,
        topic: impl Into<String>,
        task: ProtectedTask<MessageBatch, MessageBatch>,
        acknowledger: Arc<dyn BatchAcknowledger>,
        inject_trace: bool,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineError::BlankName {
                component: "processor",
            });
        }

        Ok(Self {
            name,
            topic: topic.into(),
            task,
            acknowledger,
            metrics: Arc::new(ProcessorMetrics::new()),
            inject_trace,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle for the metrics reporter.
    pub fn metrics_handle(&self) -> ProcessorMetricsHandle {
        ProcessorMetricsHandle::new(
            self.name.clone(),
            self.topic.clone(),
            Arc::clone(&self.metrics),
        )
    }

    /// Consume batches until the stream ends.
    pub async fn run<S: BatchStream>(self, mut stream: S) {
        info!(
            processor = %self.name,
            topic = %self.topic,
            "batch processor starting"
        );

        while let Some(batch) = stream.next_batch().await {
            self.process_batch(batch).await;
        }

        let snapshot = self.metrics.snapshot();
        info!(
            processor = %self.name,
            topic = %self.topic,
            batches = snapshot.batches,
            processed = snapshot.processed,
            failures = snapshot.process_failures,
            acked = snapshot.acked,
            ack_failures = snapshot.ack_failures,
            "batch processor stopping"
        );
    }

    async fn process_batch(&self, batch: MessageBatch) {
        self.metrics.record_batch();

        let context = if self.inject_trace {
            batch_context(&batch)
        } else {
            None
        };
        let span = processing_span(&self.name, "process_batch", context.as_ref());

        async {
            let size = batch.len();
            let start = Instant::now();
            match self.task.execute(batch.clone()).await {
                Ok(_) => {
                    self.metrics.record_processed(start.elapsed());
                    self.acknowledge(&batch).await;
                }
                Err(error) => {
                    self.metrics.record_process_failure(start.elapsed());
                    warn!(
                        processor = %self.name,
                        topic = %self.topic,
                        batch_size = size,
                        reason = error.reason(),
                        "batch processing failed, nothing acknowledged"
                    );
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn acknowledge(&self, batch: &MessageBatch) {
        let size = batch.len() as u64;
        let start = Instant::now();

        match self.acknowledger.ack_batch(batch.envelopes()).await {
            Ok(confirmed) => {
                let confirmed = confirmed as u64;
                self.metrics.record_acked(start.elapsed(), confirmed);

                let unconfirmed = size.saturating_sub(confirmed);
                if unconfirmed > 0 {
                    self.metrics.record_ack_failure(unconfirmed);
                    warn!(
                        processor = %self.name,
                        topic = %self.topic,
                        confirmed,
                        unconfirmed,
                        "batch partially acknowledged"
                    );
                }
            }
            Err(error) => {
                self.metrics.record_ack_failure(size);
                warn!(
                    processor = %self.name,
                    topic = %self.topic,
                    batch_size = size,
                    error = %error,
                    "batch acknowledgement failed"
                );
            }
        }
    }
}

impl std::fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("name", &self.name)
            .field("topic", &self.topic)
            .field("inject_trace", &self.inject_trace)
            .finish()
    }
}

/// One context for the whole batch: the first carrier that yields one.
fn batch_context(batch: &MessageBatch) -> Option<TraceContext> {
    batch
        .iter()
        .find_map(|envelope| extract(envelope.attributes()))
}
