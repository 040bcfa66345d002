//! Tests for CircuitBreaker state transitions

use crate::breaker::{CircuitBreaker, CircuitState};
use sluice_config::BreakerConfig;
use std::time::Duration;

fn breaker(threshold: u32, cooldown: Duration, trials: u32) -> CircuitBreaker {
    CircuitBreaker::new(
        "test",
        BreakerConfig {
            failure_threshold: threshold,
            cooldown,
            half_open_trials: trials,
        },
    )
}

// =============================================================================
// Closed state tests
// =============================================================================

#[test]
fn test_starts_closed_and_admits() {
    let breaker = breaker(3, Duration::from_secs(60), 1);

    assert_eq!(breaker.state(), CircuitState::Closed);
    assert!(breaker.try_acquire());
    assert_eq!(breaker.failure_count(), 0);
}

#[test]
fn test_failures_below_threshold_stay_closed() {
    let breaker = breaker(3, Duration::from_secs(60), 1);

    breaker.record_failure();
    breaker.record_failure();

    assert_eq!(breaker.state(), CircuitState::Closed);
    assert!(breaker.try_acquire());
    assert_eq!(breaker.failure_count(), 2);
}

#[test]
fn test_success_resets_failure_count() {
    let breaker = breaker(3, Duration::from_secs(60), 1);

    breaker.record_failure();
    breaker.record_failure();
    breaker.record_success();
    assert_eq!(breaker.failure_count(), 0);

    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Closed);
}

// =============================================================================
// Open state tests
// =============================================================================

#[test]
fn test_opens_at_threshold_and_rejects() {
    let breaker = breaker(3, Duration::from_secs(60), 1);

    for _ in 0..3 {
        breaker.record_failure();
    }

    assert_eq!(breaker.state(), CircuitState::Open);
    assert!(!breaker.try_acquire());
    assert!(!breaker.try_acquire());
}

#[test]
fn test_failures_while_open_do_not_extend_cooldown() {
    let breaker = breaker(1, Duration::from_millis(50), 1);

    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Open);

    // Still inside the cooldown window, so this counts as a plain failure.
    breaker.record_failure();

    std::thread::sleep(Duration::from_millis(80));
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
}

// =============================================================================
// Half-open state tests
// =============================================================================

#[test]
fn test_half_open_after_cooldown() {
    let breaker = breaker(1, Duration::from_millis(20), 1);

    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Open);

    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(breaker.try_acquire());
}

#[test]
fn test_half_open_admits_exactly_configured_trials() {
    let breaker = breaker(1, Duration::ZERO, 2);

    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::HalfOpen);

    assert!(breaker.try_acquire());
    assert!(breaker.try_acquire());
    assert!(!breaker.try_acquire());
}

#[test]
fn test_half_open_trials_floor_of_one() {
    let breaker = breaker(1, Duration::ZERO, 0);

    breaker.record_failure();

    assert!(breaker.try_acquire());
    assert!(!breaker.try_acquire());
}

#[test]
fn test_successful_trial_closes() {
    let breaker = breaker(1, Duration::ZERO, 1);

    breaker.record_failure();
    assert!(breaker.try_acquire());
    breaker.record_success();

    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.failure_count(), 0);
    assert!(breaker.try_acquire());
}

#[test]
fn test_failed_trial_reopens_with_fresh_cooldown() {
    let breaker = breaker(1, Duration::from_millis(50), 1);

    breaker.record_failure();
    std::thread::sleep(Duration::from_millis(80));
    assert_eq!(breaker.state(), CircuitState::HalfOpen);

    assert!(breaker.try_acquire());
    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Open);

    std::thread::sleep(Duration::from_millis(80));
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(breaker.try_acquire());
}

#[test]
fn test_state_names() {
    assert_eq!(CircuitState::Closed.as_str(), "closed");
    assert_eq!(CircuitState::Open.as_str(), "open");
    assert_eq!(CircuitState::HalfOpen.as_str(), "half_open");
}
