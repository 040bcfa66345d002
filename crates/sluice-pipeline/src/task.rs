//! Protected task - the guarded unit of work
//!
//! Wraps a handler in, outermost to innermost: pre-hook, pooled
//! dispatch, circuit breaker admission, retry loop, handler. Each layer
//! is optional and absent layers are pass-throughs. Every failure mode
//! terminates in a [`TaskResult`]; nothing throws past `execute`.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use sluice_metrics::{TaskMetrics, TaskMetricsProvider, TaskMetricsSnapshot};
use sluice_policy::{CircuitBreaker, RetryPolicy, WorkerPool};

use crate::error::{BoxError, PipelineError, Result, TaskError, TaskResult};

/// The unit of business work a pipeline protects.
///
/// `Ok(None)` means the input was intentionally consumed without
/// producing a result (for example a filtered message); it is a
/// success, not an error.
#[async_trait]
pub trait Handler<I, O>: Send + Sync {
    async fn handle(&self, input: I) -> std::result::Result<Option<O>, BoxError>;
}

/// Transforms or validates input before it reaches the handler.
///
/// A pre-hook failure short-circuits the execution; the handler is
/// never invoked.
#[async_trait]
pub trait PreHook<I>: Send + Sync {
    async fn before(&self, input: I) -> std::result::Result<I, BoxError>;
}

/// Observes the final result of an execution, success or failure.
///
/// Side effects only; the result is not altered.
#[async_trait]
pub trait PostHook<O>: Send + Sync {
    async fn after(&self, result: &TaskResult<O>);
}

/// Builder for [`ProtectedTask`].
///
/// The handler is required; every protection layer is optional.
pub struct ProtectedTaskBuilder<I, O> {
    name: String,
    handler: Option<Arc<dyn Handler<I, O>>>,
    pre: Option<Arc<dyn PreHook<I>>>,
    post: Option<Arc<dyn PostHook<O>>>,
    pool: Option<Arc<WorkerPool>>,
    breaker: Option<Arc<CircuitBreaker>>,
    retry: Option<Arc<RetryPolicy>>,
}

impl<I, O> ProtectedTaskBuilder<I, O> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: None,
            pre: None,
            post: None,
            pool: None,
            breaker: None,
            retry: None,
        }
    }

    /// Set the handler (required).
    pub fn handler(mut self, handler: Arc<dyn Handler<I, O>>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn pre_hook(mut self, hook: Arc<dyn PreHook<I>>) -> Self {
        self.pre = Some(hook);
        self
    }

    pub fn post_hook(mut self, hook: Arc<dyn PostHook<O>>) -> Self {
        self.post = Some(hook);
        self
    }

    /// Dispatch executions onto a named worker pool.
    pub fn pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Guard executions with a circuit breaker.
    pub fn breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Re-invoke the handler on failure per this retry policy.
    pub fn retry(mut self, retry: Arc<RetryPolicy>) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<ProtectedTask<I, O>> {
        if self.name.trim().is_empty() {
            return Err(PipelineError::BlankName { component: "task" });
        }
        let handler = match self.handler {
            Some(handler) => handler,
            None => return Err(PipelineError::MissingHandler { task: self.name }),
        };

        debug!(
            task = %self.name,
            pooled = self.pool.is_some(),
            breaker = self.breaker.is_some(),
            retry = self.retry.is_some(),
            "protected task built"
        );

        Ok(ProtectedTask {
            name: self.name,
            handler,
            pre: self.pre,
            post: self.post,
            pool: self.pool,
            breaker: self.breaker,
            retry: self.retry,
            metrics: Arc::new(TaskMetrics::new()),
        })
    }
}

/// A handler wrapped in its protection layers.
///
/// # Design
///
/// - Pre-hook runs on the caller, before pooling or admission
/// - With a pool, the breaker, retries and handler all run inside the
///   pooled job; the caller awaits its completion
/// - The breaker admits or rejects once per `execute`, and records one
///   outcome after the retry budget settles
/// - The post-hook observes the final result, after metrics
pub struct ProtectedTask<I, O> {
    name: String,
    handler: Arc<dyn Handler<I, O>>,
    pre: Option<Arc<dyn PreHook<I>>>,
    post: Option<Arc<dyn PostHook<O>>>,
    pool: Option<Arc<WorkerPool>>,
    breaker: Option<Arc<CircuitBreaker>>,
    retry: Option<Arc<RetryPolicy>>,
    metrics: Arc<TaskMetrics>,
}

impl<I, O> ProtectedTask<I, O> {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle for the metrics reporter.
    pub fn metrics_handle(&self) -> TaskMetricsHandle {
        TaskMetricsHandle {
            name: self.name.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<I, O> ProtectedTask<I, O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
{
    /// Run one input through the protection layers.
    pub async fn execute(&self, input: I) -> TaskResult<O> {
        let start = Instant::now();
        let result = self.dispatch(input).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(output) => {
                self.metrics.record_success(elapsed);
                if output.is_none() {
                    debug!(task = %self.name, "handler produced no output");
                }
            }
            Err(error) if error.is_rejection() => {
                self.metrics.record_rejection();
                warn!(
                    task = %self.name,
                    reason = error.reason(),
                    "execution rejected, circuit open"
                );
            }
            Err(error) => {
                self.metrics.record_failure(elapsed);
                warn!(
                    task = %self.name,
                    reason = error.reason(),
                    error = %error,
                    "execution failed"
                );
            }
        }

        if let Some(post) = &self.post {
            post.after(&result).await;
        }

        result
    }

    async fn dispatch(&self, input: I) -> TaskResult<O> {
        let input = match &self.pre {
            Some(pre) => match pre.before(input).await {
                Ok(input) => input,
                Err(error) => return Err(TaskError::PreHook(error)),
            },
            None => input,
        };

        match &self.pool {
            Some(pool) => {
                let task = self.name.clone();
                let handler = Arc::clone(&self.handler);
                let breaker = self.breaker.clone();
                let retry = self.retry.clone();
                let metrics = Arc::clone(&self.metrics);

                let handle = pool
                    .spawn(async move {
                        run_protected(
                            handler.as_ref(),
                            breaker.as_deref(),
                            retry.as_deref(),
                            &metrics,
                            &task,
                            input,
                        )
                        .await
                    })
                    .await?;

                handle.await.map_err(TaskError::JoinFailed)?
            }
            None => {
                run_protected(
                    self.handler.as_ref(),
                    self.breaker.as_deref(),
                    self.retry.as_deref(),
                    &self.metrics,
                    &self.name,
                    input,
                )
                .await
            }
        }
    }
}

impl<I, O> std::fmt::Debug for ProtectedTask<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedTask")
            .field("name", &self.name)
            .field("pooled", &self.pool.is_some())
            .field("breaker", &self.breaker.is_some())
            .field("retry", &self.retry.is_some())
            .finish()
    }
}

/// Breaker admission around the retry loop.
///
/// The breaker sees one admission and one outcome per execution, not
/// one per attempt.
async fn run_protected<I, O>(
    handler: &dyn Handler<I, O>,
    breaker: Option<&CircuitBreaker>,
    retry: Option<&RetryPolicy>,
    metrics: &TaskMetrics,
    task: &str,
    input: I,
) -> TaskResult<O>
where
    I: Clone,
{
    if let Some(breaker) = breaker {
        if !breaker.try_acquire() {
            return Err(TaskError::Rejected {
                breaker: breaker.name().to_string(),
            });
        }
    }

    let result = run_attempts(handler, retry, metrics, task, input).await;

    if let Some(breaker) = breaker {
        match &result {
            Ok(_) => breaker.record_success(),
            Err(_) => breaker.record_failure(),
        }
    }

    result
}

async fn run_attempts<I, O>(
    handler: &dyn Handler<I, O>,
    retry: Option<&RetryPolicy>,
    metrics: &TaskMetrics,
    task: &str,
    input: I,
) -> TaskResult<O>
where
    I: Clone,
{
    let max_attempts = retry.map_or(1, |r| r.max_attempts());
    let mut attempt = 0;

    loop {
        attempt += 1;
        match handler.handle(input.clone()).await {
            Ok(output) => return Ok(output),
            Err(error) if attempt < max_attempts => {
                let delay = retry.map(|r| r.delay_after(attempt)).unwrap_or_default();
                metrics.record_retry();
                debug!(
                    task = %task,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => {
                return Err(if max_attempts > 1 {
                    TaskError::RetriesExhausted {
                        attempts: attempt,
                        source: error,
                    }
                } else {
                    TaskError::Handler(error)
                });
            }
        }
    }
}

/// Metrics handle for a task, shareable with the reporter.
#[derive(Clone)]
pub struct TaskMetricsHandle {
    name: String,
    metrics: Arc<TaskMetrics>,
}

impl TaskMetricsProvider for TaskMetricsHandle {
    fn task_name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> TaskMetricsSnapshot {
        self.metrics.snapshot()
    }
}
