//! Pipeline wiring - configuration plus collaborators into running tasks
//!
//! The builder turns `[subscribers.<name>]` sections and caller-supplied
//! collaborators (puller, acknowledger, handler, hooks) into spawned
//! subscriber, staging and processor workers plus the unified metrics
//! reporter, all under one cancellation token.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use sluice_config::{Config, SubscriberConfig};
use sluice_message::{Envelope, MessageBatch};
use sluice_metrics::{
    ProcessorMetricsProvider, QueueMetricsProvider, SubscriberMetricsProvider, TaskMetricsProvider,
    UnifiedReporter,
};
use sluice_pipeline::{
    Acknowledger, BatchAcknowledger, BatchProcessor, Handler, MessageQueue, PostHook, PreHook,
    Processor, ProtectedTask, ProtectedTaskBuilder, Puller, QueueConsumer, Subscriber,
};
use sluice_policy::PolicyRegistry;

use crate::error::{Result, RuntimeError};

/// Upper bound on how long shutdown waits for any single worker.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

type WorkerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A wired but not yet spawned worker.
struct Worker {
    name: String,
    future: WorkerFuture,
}

impl Worker {
    fn new(name: String, future: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            name,
            future: Box::pin(future),
        }
    }
}

/// A spawned worker awaiting shutdown.
struct RunningWorker {
    name: String,
    handle: JoinHandle<()>,
}

/// Collaborators for one single-message pipeline.
///
/// The broker side (puller, acknowledger) and the business side
/// (handler, hooks) are supplied by the caller; everything else comes
/// from configuration.
pub struct MessagePipeline<O> {
    puller: Arc<dyn Puller>,
    acknowledger: Arc<dyn Acknowledger>,
    handler: Arc<dyn Handler<Envelope, O>>,
    pre_hook: Option<Arc<dyn PreHook<Envelope>>>,
    post_hook: Option<Arc<dyn PostHook<O>>>,
    policies: Option<String>,
}

impl<O> MessagePipeline<O> {
    pub fn new(
        puller: Arc<dyn Puller>,
        acknowledger: Arc<dyn Acknowledger>,
        handler: Arc<dyn Handler<Envelope, O>>,
    ) -> Self {
        Self {
            puller,
            acknowledger,
            handler,
            pre_hook: None,
            post_hook: None,
            policies: None,
        }
    }

    /// Run a pre-hook before each handler invocation.
    pub fn pre_hook(mut self, hook: Arc<dyn PreHook<Envelope>>) -> Self {
        self.pre_hook = Some(hook);
        self
    }

    /// Observe each final execution result.
    pub fn post_hook(mut self, hook: Arc<dyn PostHook<O>>) -> Self {
        self.post_hook = Some(hook);
        self
    }

    /// Look up retry, breaker and pool sections under this name instead
    /// of the pipeline name.
    pub fn policies(mut self, name: impl Into<String>) -> Self {
        self.policies = Some(name.into());
        self
    }
}

/// Collaborators for one whole-batch pipeline.
pub struct BatchPipeline {
    puller: Arc<dyn Puller>,
    acknowledger: Arc<dyn BatchAcknowledger>,
    handler: Arc<dyn Handler<MessageBatch, MessageBatch>>,
    pre_hook: Option<Arc<dyn PreHook<MessageBatch>>>,
    post_hook: Option<Arc<dyn PostHook<MessageBatch>>>,
    policies: Option<String>,
}

impl BatchPipeline {
    pub fn new(
        puller: Arc<dyn Puller>,
        acknowledger: Arc<dyn BatchAcknowledger>,
        handler: Arc<dyn Handler<MessageBatch, MessageBatch>>,
    ) -> Self {
        Self {
            puller,
            acknowledger,
            handler,
            pre_hook: None,
            post_hook: None,
            policies: None,
        }
    }

    /// Run a pre-hook before each handler invocation.
    pub fn pre_hook(mut self, hook: Arc<dyn PreHook<MessageBatch>>) -> Self {
        self.pre_hook = Some(hook);
        self
    }

    /// Observe each final execution result.
    pub fn post_hook(mut self, hook: Arc<dyn PostHook<MessageBatch>>) -> Self {
        self.post_hook = Some(hook);
        self
    }

    /// Look up retry, breaker and pool sections under this name instead
    /// of the pipeline name.
    pub fn policies(mut self, name: impl Into<String>) -> Self {
        self.policies = Some(name.into());
        self
    }
}

/// Wires configuration and collaborators into running pipelines.
///
/// # Design
///
/// - One cancellation token covers every worker the builder spawns
/// - Policies attach by name: a pipeline named `orders` picks up
///   `[retries.orders]`, `[breakers.orders]` and `[pools.orders]`
///   unless the bundle names a different policy section
/// - Stages are chained by channel ownership, so a stop drains front to
///   back: the subscriber exits, its channel closes, the staging queue
///   stops, and the processor finishes what was already admitted
/// - Registration errors are eager; nothing is spawned until `start`
pub struct PipelineBuilder {
    config: Config,
    registry: Arc<PolicyRegistry>,
    cancel: CancellationToken,
    names: BTreeSet<String>,
    workers: Vec<Worker>,
    queue_handles: Vec<Arc<dyn QueueMetricsProvider>>,
    subscriber_handles: Vec<Arc<dyn SubscriberMetricsProvider>>,
    task_handles: Vec<Arc<dyn TaskMetricsProvider>>,
    processor_handles: Vec<Arc<dyn ProcessorMetricsProvider>>,
}

impl PipelineBuilder {
    pub fn new(config: Config, registry: Arc<PolicyRegistry>) -> Self {
        Self {
            config,
            registry,
            cancel: CancellationToken::new(),
            names: BTreeSet::new(),
            workers: Vec::new(),
            queue_handles: Vec::new(),
            subscriber_handles: Vec::new(),
            task_handles: Vec::new(),
            processor_handles: Vec::new(),
        }
    }

    /// Register a single-message pipeline under `[subscribers.<name>]`.
    pub fn pipeline<O>(mut self, name: impl Into<String>, parts: MessagePipeline<O>) -> Result<Self>
    where
        O: Send + 'static,
    {
        let name = name.into();
        let subscriber_config = self.subscriber_config(&name)?.clone();
        let staging = self.staging_queue(&name, &subscriber_config)?;

        let task = self.build_task(
            &name,
            parts.policies,
            parts.handler,
            parts.pre_hook,
            parts.post_hook,
        )?;
        self.task_handles.push(Arc::new(task.metrics_handle()));

        let subscriber = Subscriber::new(
            &name,
            subscriber_config.clone(),
            parts.puller,
            self.cancel.clone(),
        )?;
        self.subscriber_handles
            .push(Arc::new(subscriber.metrics_handle()));

        let processor = Processor::new(
            &name,
            subscriber_config.topic.clone(),
            task,
            parts.acknowledger,
            subscriber_config.inject_trace,
        )?;
        self.processor_handles
            .push(Arc::new(processor.metrics_handle()));

        let (tx, rx) = mpsc::channel(1);
        self.workers
            .push(Worker::new(format!("{name}-subscriber"), subscriber.run(tx)));

        match staging {
            Some((queue, consumer)) => {
                self.queue_handles.push(Arc::new(queue.metrics_handle()));
                self.workers
                    .push(Worker::new(format!("{name}-staging"), pump(queue, rx)));
                self.workers.push(Worker::new(
                    format!("{name}-processor"),
                    processor.run(consumer),
                ));
            }
            None => {
                self.workers
                    .push(Worker::new(format!("{name}-processor"), processor.run(rx)));
            }
        }

        info!(
            pipeline = %name,
            topic = %subscriber_config.topic,
            queue = ?subscriber_config.queue,
            "pipeline registered"
        );
        self.names.insert(name);
        Ok(self)
    }

    /// Register a whole-batch pipeline under `[subscribers.<name>]`.
    pub fn batch_pipeline(mut self, name: impl Into<String>, parts: BatchPipeline) -> Result<Self> {
        let name = name.into();
        let subscriber_config = self.subscriber_config(&name)?.clone();
        let staging = self.staging_queue(&name, &subscriber_config)?;

        let task = self.build_task(
            &name,
            parts.policies,
            parts.handler,
            parts.pre_hook,
            parts.post_hook,
        )?;
        self.task_handles.push(Arc::new(task.metrics_handle()));

        let subscriber = Subscriber::new(
            &name,
            subscriber_config.clone(),
            parts.puller,
            self.cancel.clone(),
        )?;
        self.subscriber_handles
            .push(Arc::new(subscriber.metrics_handle()));

        let processor = BatchProcessor::new(
            &name,
            subscriber_config.topic.clone(),
            task,
            parts.acknowledger,
            subscriber_config.inject_trace,
        )?;
        self.processor_handles
            .push(Arc::new(processor.metrics_handle()));

        let (tx, rx) = mpsc::channel(1);
        self.workers
            .push(Worker::new(format!("{name}-subscriber"), subscriber.run(tx)));

        match staging {
            Some((queue, consumer)) => {
                self.queue_handles.push(Arc::new(queue.metrics_handle()));
                self.workers
                    .push(Worker::new(format!("{name}-staging"), pump(queue, rx)));
                self.workers.push(Worker::new(
                    format!("{name}-processor"),
                    processor.run(consumer),
                ));
            }
            None => {
                self.workers
                    .push(Worker::new(format!("{name}-processor"), processor.run(rx)));
            }
        }

        info!(
            pipeline = %name,
            topic = %subscriber_config.topic,
            queue = ?subscriber_config.queue,
            "batch pipeline registered"
        );
        self.names.insert(name);
        Ok(self)
    }

    /// Spawn every registered worker plus the metrics reporter.
    pub fn start(self) -> Pipelines {
        let metrics_enabled = self.config.metrics.enabled;
        let reporter = UnifiedReporter::builder()
            .config(self.config.metrics.clone())
            .queues(self.queue_handles)
            .subscribers(self.subscriber_handles)
            .tasks(self.task_handles)
            .processors(self.processor_handles)
            .build();

        let mut workers: Vec<RunningWorker> = self
            .workers
            .into_iter()
            .map(|worker| RunningWorker {
                name: worker.name,
                handle: tokio::spawn(worker.future),
            })
            .collect();

        workers.push(RunningWorker {
            name: "metrics-reporter".into(),
            handle: tokio::spawn(reporter.run(self.cancel.clone())),
        });

        info!(
            pipelines = self.names.len(),
            workers = workers.len(),
            metrics_enabled,
            "pipelines running"
        );

        Pipelines {
            cancel: self.cancel,
            registry: self.registry,
            workers,
        }
    }

    fn subscriber_config(&self, name: &str) -> Result<&SubscriberConfig> {
        if self.names.contains(name) {
            return Err(RuntimeError::DuplicatePipeline {
                name: name.to_string(),
            });
        }
        match self.config.subscriber(name) {
            Some(config) => Ok(config),
            None => Err(RuntimeError::UnknownSubscriber {
                name: name.to_string(),
            }),
        }
    }

    /// Create the staging queue named by the subscriber, if any.
    fn staging_queue(
        &self,
        name: &str,
        config: &SubscriberConfig,
    ) -> Result<Option<(MessageQueue<MessageBatch>, QueueConsumer<MessageBatch>)>> {
        let queue_name = match config.queue.as_deref() {
            Some(queue_name) => queue_name,
            None => return Ok(None),
        };
        let capacity = match self.config.queue(queue_name) {
            Some(queue_config) => queue_config.capacity,
            None => {
                return Err(RuntimeError::UnknownQueue {
                    subscriber: name.to_string(),
                    queue: queue_name.to_string(),
                })
            }
        };
        let (queue, consumer) = MessageQueue::new(queue_name, capacity)?;
        Ok(Some((queue, consumer)))
    }

    /// Build the protected task, attaching policies configured under the
    /// policy name.
    fn build_task<I, O>(
        &self,
        name: &str,
        policies: Option<String>,
        handler: Arc<dyn Handler<I, O>>,
        pre_hook: Option<Arc<dyn PreHook<I>>>,
        post_hook: Option<Arc<dyn PostHook<O>>>,
    ) -> Result<ProtectedTask<I, O>> {
        let policy_name = policies.unwrap_or_else(|| name.to_string());

        let mut builder = ProtectedTaskBuilder::new(name).handler(handler);
        if let Some(hook) = pre_hook {
            builder = builder.pre_hook(hook);
        }
        if let Some(hook) = post_hook {
            builder = builder.post_hook(hook);
        }
        if let Some(retry) = self.registry.retry(&policy_name) {
            builder = builder.retry(retry);
        }
        if let Some(breaker) = self.registry.breaker(&policy_name) {
            builder = builder.breaker(breaker);
        }
        if let Some(pool) = self.registry.pool(&policy_name) {
            builder = builder.pool(pool);
        }

        Ok(builder.build()?)
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("pipelines", &self.names)
            .field("workers", &self.workers.len())
            .finish()
    }
}

/// Moves batches from the subscriber channel into the staging queue,
/// stopping the queue when the channel closes so the consumer drains.
async fn pump(queue: MessageQueue<MessageBatch>, mut rx: mpsc::Receiver<MessageBatch>) {
    while let Some(batch) = rx.recv().await {
        if queue.push(batch).await.is_err() {
            break;
        }
    }
    queue.stop();
}

/// Handle over the spawned pipeline workers.
///
/// # Design
///
/// - `shutdown` cancels and then joins each worker with a timeout;
///   cancelling an already-cancelled token is harmless
/// - `join` waits for workers without cancelling, for callers that
///   drive the cancellation token themselves
/// - Worker pools close after the workers are down, so no execution is
///   refused a pool it was promised
pub struct Pipelines {
    cancel: CancellationToken,
    registry: Arc<PolicyRegistry>,
    workers: Vec<RunningWorker>,
}

impl Pipelines {
    /// Token that stops every worker; clone it to wire external signals.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop all workers and wait for them to drain.
    pub async fn shutdown(self) {
        info!("pipelines shutting down");
        self.cancel.cancel();

        for worker in self.workers {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, worker.handle).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(worker = %worker.name, error = %error, "worker panicked during shutdown")
                }
                Err(_) => warn!(worker = %worker.name, "worker did not stop within timeout"),
            }
        }

        self.registry.shutdown_pools();
        info!("pipelines shutdown complete");
    }

    /// Wait for all workers without cancelling them.
    pub async fn join(self) {
        for worker in self.workers {
            if let Err(error) = worker.handle.await {
                warn!(worker = %worker.name, error = %error, "worker panicked");
            }
        }
        self.registry.shutdown_pools();
    }
}

impl std::fmt::Debug for Pipelines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipelines")
            .field("workers", &self.workers.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
