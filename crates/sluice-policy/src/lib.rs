//! Protection policies for the Sluice consumer pipeline
//!
//! This crate provides the machinery that guards message handlers:
//! - `RetryPolicy` - Exponential backoff with cap and jitter
//! - `CircuitBreaker` - Closed / Open / HalfOpen admission control
//! - `WorkerPool` - Bounded concurrent execution on the runtime
//! - `PolicyRegistry` - Named, lazily created policy instances
//!
//! # Design Principles
//!
//! - **Lock-free hot path**: breakers use atomics; the registry locks only
//!   on first creation of a name.
//! - **Config-driven**: policies exist for exactly the names configured;
//!   lookups for other names return `None`.
//! - **One instance per name**: concurrent first lookups of the same name
//!   observe a single shared instance.

mod breaker;
mod pool;
mod registry;
mod retry;

pub use breaker::{CircuitBreaker, CircuitState};
pub use pool::{PoolClosed, WorkerPool};
pub use registry::PolicyRegistry;
pub use retry::RetryPolicy;

// Test modules - only compiled during testing
#[cfg(test)]
mod breaker_test;
