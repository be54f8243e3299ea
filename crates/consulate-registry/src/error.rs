//! Error types for the registry client.

use thiserror::Error;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors returned by registry operations.
///
/// Each operation variant carries either the transport error text or the
/// raw status line returned by the agent (e.g. `500 Internal Server Error`).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registry address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("service registration failed: {0}")]
    Registration(String),

    #[error("service deregistration failed: {0}")]
    Deregistration(String),

    #[error("check update failed: {0}")]
    CheckUpdate(String),
}
