//! Logging initialization
//!
//! Builds the global tracing subscriber from [`LogConfig`]. `RUST_LOG`
//! takes precedence over the configured level when set.

use sluice_config::{LogConfig, LogFormat, LogOutput};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Callable more than once; only the first call installs a subscriber
/// and later calls are no-ops.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, &config.output) {
        (LogFormat::Console, LogOutput::Stdout) => {
            let _ = registry
                .with(fmt::layer().with_target(true))
                .try_init();
        }
        (LogFormat::Console, LogOutput::Stderr) => {
            let _ = registry
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .try_init();
        }
        (LogFormat::Json, LogOutput::Stdout) => {
            let _ = registry.with(fmt::layer().json()).try_init();
        }
        (LogFormat::Json, LogOutput::Stderr) => {
            let _ = registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init();
        }
    }
}
