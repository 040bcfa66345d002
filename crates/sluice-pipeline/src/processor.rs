//! Single-message processor - execute, then acknowledge
//!
//! Flattens incoming batches and runs each envelope through a protected
//! task. Successful executions are acknowledged; failures are logged
//! and counted and the message is left to broker redelivery. One bad
//! message never stops the stream.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn, Instrument};

use sluice_message::{Envelope, MessageBatch};
use sluice_metrics::{ProcessorMetrics, ProcessorMetricsProvider, ProcessorMetricsSnapshot};
use sluice_trace::{extract, processing_span};

use crate::broker::Acknowledger;
use crate::error::{PipelineError, Result};
use crate::queue::QueueConsumer;
use crate::task::ProtectedTask;

/// Source of batches for a processor.
///
/// Lets a processor drain either a subscriber channel or a bounded
/// queue without knowing which is upstream. The stream ends with `None`
/// when the upstream stops; the processor finishes what it already
/// received.
#[async_trait]
pub trait BatchStream: Send {
    async fn next_batch(&mut self) -> Option<MessageBatch>;
}

#[async_trait]
impl BatchStream for mpsc::Receiver<MessageBatch> {
    async fn next_batch(&mut self) -> Option<MessageBatch> {
        self.recv().await
    }
}

#[async_trait]
impl BatchStream for QueueConsumer<MessageBatch> {
    async fn next_batch(&mut self) -> Option<MessageBatch> {
        self.next().await
    }
}

/// Per-message consumer: trace context, protected execution, ack.
///
/// # Design
///
/// - Trace context is extracted once per envelope from its attributes
///   (when enabled) and carried on the processing span
/// - `Ok` results, including `Ok(None)`, are acknowledged; `Err`
///   results are not
/// - Ack refusals and errors are terminal for that message: logged,
///   counted, no re-ack attempt
pub struct Processor<O> {
    name: String,
    topic: String,
    task: ProtectedTask<Envelope, O>,
    acknowledger: Arc<dyn Acknowledger>,
    metrics: Arc<ProcessorMetrics>,
    inject_trace: bool,
}

impl<O> Processor<O>
where
    O: Send + 'static,
{
    pub fn new(
        name: impl Into<String>,
        topic: impl Into<String>,
        task: ProtectedTask<Envelope, O>,
        acknowledger: Arc<dyn Acknowledger>,
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
            "processor starting"
        );

        while let Some(batch) = stream.next_batch().await {
            self.metrics.record_batch();
            for envelope in batch {
                self.process_one(envelope).await;
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            processor = %self.name,
            topic = %self.topic,
            processed = snapshot.processed,
            failures = snapshot.process_failures,
            acked = snapshot.acked,
            ack_failures = snapshot.ack_failures,
            "processor stopping"
        );
    }

    async fn process_one(&self, envelope: Envelope) {
        let context = if self.inject_trace {
            extract(envelope.attributes())
        } else {
            None
        };
        let span = processing_span(&self.name, "process", context.as_ref());

        async {
            let start = Instant::now();
            match self.task.execute(envelope.clone()).await {
                Ok(_) => {
                    self.metrics.record_processed(start.elapsed());
                    self.acknowledge(&envelope).await;
                }
                Err(error) => {
                    self.metrics.record_process_failure(start.elapsed());
                    warn!(
                        processor = %self.name,
                        topic = %self.topic,
                        message_id = %envelope.id(),
                        reason = error.reason(),
                        "processing failed, message left unacknowledged"
                    );
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn acknowledge(&self, envelope: &Envelope) {
        let start = Instant::now();
        match self.acknowledger.ack(envelope).await {
            Ok(true) => self.metrics.record_acked(start.elapsed(), 1),
            Ok(false) => {
                self.metrics.record_ack_failure(1);
                warn!(
                    processor = %self.name,
                    message_id = %envelope.id(),
                    "broker declined acknowledgement"
                );
            }
            Err(error) => {
                self.metrics.record_ack_failure(1);
                warn!(
                    processor = %self.name,
                    message_id = %envelope.id(),
                    error = %error,
                    "acknowledgement failed"
                );
            }
        }
    }
}

impl<O> std::fmt::Debug for Processor<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("name", &self.name)
            .field("topic", &self.topic)
            .field("inject_trace", &self.inject_trace)
            .finish()
    }
}

/// Metrics handle for a processor.
#[derive(Clone)]
pub struct ProcessorMetricsHandle {
    name: String,
    topic: String,
    metrics: Arc<ProcessorMetrics>,
}

impl ProcessorMetricsHandle {
    pub(crate) fn new(name: String, topic: String, metrics: Arc<ProcessorMetrics>) -> Self {
        Self {
            name,
            topic,
            metrics,
        }
    }
}

impl ProcessorMetricsProvider for ProcessorMetricsHandle {
    fn processor_name(&self) -> &str {
        &self.name
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn snapshot(&self) -> ProcessorMetricsSnapshot {
        self.metrics.snapshot()
    }
}
