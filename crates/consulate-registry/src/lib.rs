//! consulate-registry — client for the Consul agent's service and check API.
//!
//! Registers a service with its health check, pushes check status updates,
//! and deregisters the service. The client holds nothing but the normalized
//! agent address, so every operation is independent and can run concurrently
//! with the others.
//!
//! # Agent endpoints
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | POST | `/v1/agent/service/register` | [`RegistryClient::register`] |
//! | GET | `/v1/agent/service/deregister/{id}` | [`RegistryClient::deregister`] |
//! | GET | `/v1/agent/check/{pass,warn,fail}/{check_id}?note=` | [`RegistryClient::update_check`] |

pub mod client;
pub mod error;
pub mod types;

pub use client::RegistryClient;
pub use error::{RegistryError, RegistryResult};
pub use types::{CheckDefinition, CheckStatus, Registration, ServiceRegistration, check_id_for};
