//! Worker pool - bounded concurrent execution
//!
//! A pool is a named semaphore over the shared tokio runtime: `spawn`
//! waits for a permit, then runs the future as a task that holds the
//! permit until completion. At most `workers` futures from this pool run
//! at once; submission applies backpressure instead of queueing unbounded.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sluice_config::PoolConfig;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::info;

/// Error returned when spawning on a pool that has been shut down.
#[derive(Debug, Error)]
#[error("worker pool '{pool}' is shut down")]
pub struct PoolClosed {
    /// Pool name
    pub pool: String,
}

/// Named bounded executor.
#[derive(Debug)]
pub struct WorkerPool {
    name: String,
    workers: usize,
    permits: Arc<Semaphore>,
    shut_down: AtomicBool,
}

impl WorkerPool {
    pub fn new(name: impl Into<String>, config: PoolConfig) -> Self {
        // A zero-permit pool would park every spawn forever.
        let workers = config.workers.max(1);
        Self {
            name: name.into(),
            workers,
            permits: Arc::new(Semaphore::new(workers)),
            shut_down: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum concurrent tasks.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Tasks currently holding a permit.
    pub fn active(&self) -> usize {
        self.workers.saturating_sub(self.permits.available_permits())
    }

    /// Run a future on the pool.
    ///
    /// Waits until a permit is free (this is the pool's backpressure),
    /// then spawns the future as a runtime task. The permit is released
    /// when the future completes.
    pub async fn spawn<F>(&self, future: F) -> Result<JoinHandle<F::Output>, PoolClosed>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolClosed {
                pool: self.name.clone(),
            })?;

        Ok(tokio::spawn(async move {
            let _permit = permit;
            future.await
        }))
    }

    /// Shut the pool down. Idempotent.
    ///
    /// Running tasks keep their permits and finish; waiting and future
    /// `spawn` calls fail with [`PoolClosed`].
    pub fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            self.permits.close();
            info!(pool = %self.name, "worker pool shut down");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}
