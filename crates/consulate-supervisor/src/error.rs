//! Supervised command errors.

use thiserror::Error;

/// Why a supervised command did not succeed.
///
/// `Clone` so one outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no command given")]
    Empty,

    #[error("failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },

    #[error("{0}")]
    Exited(String),

    #[error("supervisor stopped without reporting an outcome")]
    Aborted,
}
