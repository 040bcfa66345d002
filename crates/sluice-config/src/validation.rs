//! Configuration validation
//!
//! Validates config consistency:
//! - Section names are not blank
//! - Policy numbers are usable (attempts, thresholds, worker counts >= 1)
//! - Delay bounds are ordered (base_delay <= max_delay)
//! - Subscribers reference queues that exist

use crate::error::{ConfigError, Result};
use crate::Config;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_names(config)?;
    validate_retries(config)?;
    validate_breakers(config)?;
    validate_pools(config)?;
    validate_queues(config)?;
    validate_subscribers(config)?;
    Ok(())
}

fn validate_names(config: &Config) -> Result<()> {
    let sections: [(&'static str, Vec<&String>); 5] = [
        ("retry", config.retries.keys().collect()),
        ("breaker", config.breakers.keys().collect()),
        ("pool", config.pools.keys().collect()),
        ("queue", config.queues.keys().collect()),
        ("subscriber", config.subscribers.keys().collect()),
    ];

    for (component, names) in sections {
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::blank_name(component));
        }
    }
    Ok(())
}

fn validate_retries(config: &Config) -> Result<()> {
    for (name, retry) in &config.retries {
        if retry.max_attempts == 0 {
            return Err(ConfigError::invalid_value(
                "retry",
                name,
                "max_attempts",
                "must be at least 1",
            ));
        }
        if retry.base_delay > retry.max_delay {
            return Err(ConfigError::invalid_value(
                "retry",
                name,
                "base_delay",
                format!(
                    "base_delay {:?} exceeds max_delay {:?}",
                    retry.base_delay, retry.max_delay
                ),
            ));
        }
    }
    Ok(())
}

fn validate_breakers(config: &Config) -> Result<()> {
    for (name, breaker) in &config.breakers {
        if breaker.failure_threshold == 0 {
            return Err(ConfigError::invalid_value(
                "breaker",
                name,
                "failure_threshold",
                "must be at least 1",
            ));
        }
        if breaker.cooldown.is_zero() {
            return Err(ConfigError::invalid_value(
                "breaker",
                name,
                "cooldown",
                "must be greater than zero",
            ));
        }
        if breaker.half_open_trials == 0 {
            return Err(ConfigError::invalid_value(
                "breaker",
                name,
                "half_open_trials",
                "must be at least 1",
            ));
        }
    }
    Ok(())
}

fn validate_pools(config: &Config) -> Result<()> {
    for (name, pool) in &config.pools {
        if pool.workers == 0 {
            return Err(ConfigError::invalid_value(
                "pool",
                name,
                "workers",
                "must be at least 1",
            ));
        }
    }
    Ok(())
}

fn validate_queues(config: &Config) -> Result<()> {
    for (name, queue) in &config.queues {
        if queue.capacity == 0 {
            return Err(ConfigError::invalid_value(
                "queue",
                name,
                "capacity",
                "must be at least 1",
            ));
        }
    }
    Ok(())
}

fn validate_subscribers(config: &Config) -> Result<()> {
    for (name, subscriber) in &config.subscribers {
        if subscriber.topic.trim().is_empty() {
            return Err(ConfigError::missing_field("subscriber", name, "topic"));
        }
        if let Some(queue) = &subscriber.queue {
            if !config.queues.contains_key(queue) {
                return Err(ConfigError::invalid_value(
                    "subscriber",
                    name,
                    "queue",
                    format!("references unknown queue '{queue}'"),
                ));
            }
        }
    }
    Ok(())
}
