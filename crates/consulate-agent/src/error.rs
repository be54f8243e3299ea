//! Configuration errors.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while building an [`AgentConfig`](crate::AgentConfig).
/// All of them abort before anything is sent to the registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a service name is required")]
    MissingName,

    #[error("invalid check definition: {0}")]
    InvalidCheck(String),

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("heartbeat interval {interval:?} must be greater than zero and at most {max:?}")]
    InvalidInterval { interval: Duration, max: Duration },
}
