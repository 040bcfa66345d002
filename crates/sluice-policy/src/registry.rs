//! Named policy registry
//!
//! Policies are declared in configuration and materialized lazily on
//! first lookup. The registry guarantees one instance per name: all
//! executions of a task named "payments" share the same breaker, the
//! same retry policy and the same pool.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sluice_config::Config;

use crate::breaker::CircuitBreaker;
use crate::pool::WorkerPool;
use crate::retry::RetryPolicy;

/// Registry of named retry policies, circuit breakers and worker pools.
///
/// Shared via `Arc` between the runtime builder and every pipeline it
/// assembles. Lookups for names with no configuration section return
/// `None`; the caller then runs unprotected, which is not an error.
pub struct PolicyRegistry {
    config: Config,
    retries: Mutex<HashMap<String, Arc<RetryPolicy>>>,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
    pools: Mutex<HashMap<String, Arc<WorkerPool>>>,
}

impl PolicyRegistry {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            retries: Mutex::new(HashMap::new()),
            breakers: Mutex::new(HashMap::new()),
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration this registry draws from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Retry policy for a name, creating it on first access.
    pub fn retry(&self, name: &str) -> Option<Arc<RetryPolicy>> {
        let config = self.config.retry(name)?.clone();
        let mut map = self.retries.lock();
        let policy = map
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RetryPolicy::new(name, config)));
        Some(Arc::clone(policy))
    }

    /// Circuit breaker for a name, creating it on first access.
    pub fn breaker(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        let config = self.config.breaker(name)?.clone();
        let mut map = self.breakers.lock();
        let breaker = map
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(name, config)));
        Some(Arc::clone(breaker))
    }

    /// Worker pool for a name, creating it on first access.
    pub fn pool(&self, name: &str) -> Option<Arc<WorkerPool>> {
        let config = *self.config.pool(name)?;
        let mut map = self.pools.lock();
        let pool = map
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(WorkerPool::new(name, config)));
        Some(Arc::clone(pool))
    }

    /// All pools created so far, for shutdown.
    pub fn pools(&self) -> Vec<Arc<WorkerPool>> {
        self.pools.lock().values().map(Arc::clone).collect()
    }

    /// Shut down every pool created through this registry. Idempotent.
    pub fn shutdown_pools(&self) {
        for pool in self.pools() {
            pool.shutdown();
        }
    }
}
