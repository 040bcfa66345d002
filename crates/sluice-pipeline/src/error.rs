//! Pipeline error types
//!
//! Runtime failures are absorbed into typed results and metrics; only
//! construction mistakes surface as `PipelineError` at build time.

use thiserror::Error;

use sluice_policy::PoolClosed;

/// Boxed error carried across the collaborator trait boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one protected execution.
///
/// `Ok(None)` means the handler intentionally produced nothing (for
/// example a filtered message) and is still a success.
pub type TaskResult<O> = std::result::Result<Option<O>, TaskError>;

/// Construction errors
///
/// These indicate programmer error in the wiring, not runtime
/// conditions, and are raised eagerly.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Component was given an empty or whitespace-only name
    #[error("{component} name must not be blank")]
    BlankName { component: &'static str },

    /// Queue capacity of zero would deadlock every producer
    #[error("queue '{queue}' capacity must be greater than zero")]
    ZeroCapacity { queue: String },

    /// Protected task built without a handler
    #[error("protected task '{task}' has no handler")]
    MissingHandler { task: String },
}

/// Result type for pipeline construction
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error returned by `MessageQueue::push` once intake is closed.
#[derive(Debug, Error)]
#[error("message queue '{queue}' is stopped")]
pub struct QueueClosed {
    /// Queue name
    pub queue: String,
}

/// Failure of one protected execution.
///
/// Every stage of the task converts its errors into one of these
/// variants; nothing propagates past `execute` as a panic.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The circuit breaker was open; the handler was never invoked
    #[error("circuit breaker '{breaker}' rejected the call")]
    Rejected {
        /// Breaker name
        breaker: String,
    },

    /// The attempt budget is spent; carries the last handler error
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Attempts made, including the first
        attempts: u32,
        #[source]
        source: BoxError,
    },

    /// The handler failed and no retry policy was configured
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The pre-hook failed; the handler was never invoked
    #[error("pre-hook failed: {0}")]
    PreHook(#[source] BoxError),

    /// The pooled task was cancelled or panicked
    #[error("task did not complete: {0}")]
    JoinFailed(#[source] tokio::task::JoinError),

    /// The worker pool stopped admitting work
    #[error(transparent)]
    PoolClosed(#[from] PoolClosed),
}

impl TaskError {
    /// Stable failure class, used as the `reason` tag on metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            TaskError::Rejected { .. } => "breaker_open",
            TaskError::RetriesExhausted { .. } => "retries_exhausted",
            TaskError::Handler(_) => "handler_error",
            TaskError::PreHook(_) => "pre_hook_error",
            TaskError::JoinFailed(_) => "join_failed",
            TaskError::PoolClosed(_) => "pool_closed",
        }
    }

    /// True when the call was rejected without reaching the handler.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TaskError::Rejected { .. })
    }
}
