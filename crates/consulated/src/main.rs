//! consulate — run a command as a Consul-registered service.
//!
//! Registers the service with the agent, heartbeats its TTL check while
//! the command runs, then deregisters it on a clean exit or marks the
//! check as failing otherwise.
//!
//! # Usage
//!
//! ```text
//! consulate --name my-service --port 8080 -- my_script.sh arg1 arg2
//! ```
//!
//! Configuration and registration failures exit non-zero. The monitored
//! command's own exit status is reported to the registry, not to the caller.

mod cli;

use clap::Parser;
use consulate_agent::{AgentConfig, run_agent};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the monitored command.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,consulate_agent=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AgentConfig::from_options(cli.into_options())?;

    info!(
        registry = %config.registry_addr(),
        service_id = %config.service_id(),
        interval = ?config.heartbeat_interval(),
        "consulate starting"
    );

    match run_agent(&config).await? {
        Some(outcome) => match outcome.error {
            Some(error) => warn!(%error, "monitored command failed"),
            None => info!("monitored command finished"),
        },
        None => info!("heartbeat stopped"),
    }

    Ok(())
}
