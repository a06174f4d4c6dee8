//! Tracing subscriber setup for binaries

use crate::error::StageError;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `default_level` when set. Fails if a subscriber
/// is already installed.
pub fn init_tracing(default_level: &str, json: bool) -> Result<(), StageError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(default_level),
    }
    .map_err(|e| StageError::Config(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| StageError::Config(format!("Failed to install tracing subscriber: {}", e)))
}
