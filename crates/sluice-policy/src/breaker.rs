//! Circuit breaker with half-open trial calls
//!
//! State machine:
//!
//! ```text
//!  Closed ──(threshold consecutive failures)──► Open
//!    ▲                                            │
//!    │                                      (cooldown elapses)
//!    │                                            ▼
//!    └──(trial succeeds)──── HalfOpen ◄───────────┘
//!                               │
//!                               └──(trial fails)──► Open (fresh cooldown)
//! ```
//!
//! All state lives in atomics; the breaker is shared via `Arc` across all
//! executions of a task.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sluice_config::BreakerConfig;
use tracing::{info, warn};

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls flow through; failures are counted.
    Closed,
    /// Calls are rejected without reaching the handler.
    Open,
    /// Cooldown elapsed; a limited number of trial calls may pass.
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Circuit breaker guarding one named task.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    /// Consecutive failures while closed
    failures: AtomicU32,
    /// Epoch millis when the breaker opened; 0 while closed
    opened_at_ms: AtomicU64,
    /// Trial calls admitted since entering half-open
    half_open_inflight: AtomicU32,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            failures: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(0),
            half_open_inflight: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, derived from the open timestamp and cooldown.
    pub fn state(&self) -> CircuitState {
        let opened_at = self.opened_at_ms.load(Ordering::Relaxed);
        if opened_at == 0 {
            CircuitState::Closed
        } else if elapsed_ms(opened_at) >= self.cooldown_ms() {
            CircuitState::HalfOpen
        } else {
            CircuitState::Open
        }
    }

    /// Whether a call may proceed right now.
    ///
    /// Open rejects outright. HalfOpen admits up to the configured number
    /// of concurrent trial calls; the rest are rejected until a trial
    /// settles the state.
    pub fn try_acquire(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                let cap = self.config.half_open_trials.max(1);
                self.half_open_inflight
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                        (n < cap).then_some(n + 1)
                    })
                    .is_ok()
            }
        }
    }

    /// Record a successful call. Closes the breaker if it was open.
    pub fn record_success(&self) {
        let was_open = self.opened_at_ms.swap(0, Ordering::Relaxed) != 0;
        self.failures.store(0, Ordering::Relaxed);
        self.half_open_inflight.store(0, Ordering::Relaxed);

        if was_open {
            info!(breaker = %self.name, "circuit breaker closed");
        }
    }

    /// Record a failed call (after any retries were exhausted).
    pub fn record_failure(&self) {
        let opened_at = self.opened_at_ms.load(Ordering::Relaxed);

        if opened_at != 0 {
            // A failure while half-open means the trial failed; restart the
            // cooldown. Failures while fully open are stale calls admitted
            // before the breaker tripped.
            if elapsed_ms(opened_at) >= self.cooldown_ms() {
                self.opened_at_ms.store(now_ms(), Ordering::Relaxed);
                self.half_open_inflight.store(0, Ordering::Relaxed);
                warn!(breaker = %self.name, "circuit breaker reopened after failed trial");
            }
            return;
        }

        let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold
            && self
                .opened_at_ms
                .compare_exchange(0, now_ms(), Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
        {
            warn!(
                breaker = %self.name,
                failures,
                cooldown_secs = self.config.cooldown.as_secs(),
                "circuit breaker opened"
            );
        }
    }

    /// Consecutive failures counted while closed.
    pub fn failure_count(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    #[inline]
    fn cooldown_ms(&self) -> u64 {
        self.config.cooldown.as_millis() as u64
    }
}

#[inline]
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[inline]
fn elapsed_ms(since_ms: u64) -> u64 {
    now_ms().saturating_sub(since_ms)
}
