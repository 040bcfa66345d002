//! Runtime error types

use thiserror::Error;

/// Errors raised while wiring pipelines from configuration.
///
/// All of these are construction-time errors; once `start` succeeds the
/// running pipelines absorb failures into logs and metrics instead.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No `[subscribers.<name>]` section in the configuration
    #[error("no [subscribers.{name}] section in configuration")]
    UnknownSubscriber { name: String },

    /// Subscriber references a queue with no `[queues.<name>]` section
    #[error("subscriber '{subscriber}' references unknown queue '{queue}'")]
    UnknownQueue { subscriber: String, queue: String },

    /// The same subscriber was registered twice
    #[error("pipeline '{name}' is already registered")]
    DuplicatePipeline { name: String },

    /// Component construction failed
    #[error(transparent)]
    Pipeline(#[from] sluice_pipeline::PipelineError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
