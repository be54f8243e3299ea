//! consulate-agent — keeps a registry entry in step with a supervised command.
//!
//! Registers the service, heartbeats its TTL check while the command runs,
//! and settles the registry entry once the command exits: a clean exit
//! deregisters the service, a failure marks its check as failing.
//!
//! # Architecture
//!
//! ```text
//! run_agent(&AgentConfig)
//!   ├── RegistryClient::register()          (fatal on error)
//!   ├── Supervisor::spawn(command)          (optional)
//!   ├── HeartbeatSession::run()             (until Completion fires)
//!   └── settle()
//!       ├── success → RegistryClient::deregister()
//!       └── failure → RegistryClient::update_check(.., Fail)
//! ```
//!
//! Without a command the heartbeat never stops on its own; the process
//! runs until it is terminated externally.

pub mod agent;
pub mod config;
pub mod error;
pub mod heartbeat;

pub use agent::run_agent;
pub use config::{AgentConfig, AgentOptions, parse_duration};
pub use error::ConfigError;
pub use heartbeat::{HEARTBEAT_NOTE, HeartbeatSession};
