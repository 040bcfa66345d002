//! Sluice runtime - logging initialization and pipeline wiring
//!
//! The top of the stack: turn a [`sluice_config::Config`] plus broker
//! and business collaborators into running pipelines.
//!
//! - `init_logging` - tracing subscriber from `[log]`
//! - `PipelineBuilder` - `[subscribers.*]` sections + collaborator
//!   bundles into spawned subscriber / staging / processor workers
//! - `Pipelines` - the shutdown handle over everything spawned
//!
//! # Design Principles
//!
//! - **Eager wiring**: unknown names and invalid components fail at
//!   registration, before anything is spawned.
//! - **One token**: a single `CancellationToken` stops the reporter and
//!   every pipeline; stages drain front to back.
//! - **Configuration names things**: pipelines, queues and policies are
//!   matched by the section names in the TOML file.

mod builder;
mod error;
mod logging;

pub use builder::{BatchPipeline, MessagePipeline, PipelineBuilder, Pipelines};
pub use error::{Result, RuntimeError};
pub use logging::init_logging;

// Test modules - only compiled during testing
#[cfg(test)]
mod builder_test;
