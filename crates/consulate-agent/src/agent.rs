//! Orchestration: register, supervise, heartbeat, settle.

use anyhow::Context;
use consulate_registry::{CheckStatus, Registration, RegistryClient};
use consulate_supervisor::{ProcessOutcome, Supervisor};
use tracing::{error, info};

use crate::config::AgentConfig;
use crate::heartbeat::{HEARTBEAT_NOTE, HeartbeatSession};

/// Register the service and keep it in step with the supervised command.
///
/// Returns the command's outcome once the registry entry has been settled.
/// Without a command the heartbeat runs until the process is terminated,
/// so this never returns under normal operation.
///
/// Only a bad registry address or a failed registration are errors. A
/// failure of the final deregistration or fail-mark is logged and does not
/// change the result.
pub async fn run_agent(config: &AgentConfig) -> anyhow::Result<Option<ProcessOutcome>> {
    let client = RegistryClient::new(config.registry_addr())?;
    let registration = client
        .register(&config.registration())
        .await
        .with_context(|| {
            format!("registering {} with {}", config.service_id(), client.address())
        })?;

    let supervisor = match config.command() {
        Some(args) => {
            info!(command = %args.join(" "), "monitoring command");
            Some(Supervisor::spawn(args.to_vec()))
        }
        None => {
            info!("no command specified, running indefinitely");
            None
        }
    };

    HeartbeatSession::new(
        registration.check_id.clone(),
        HEARTBEAT_NOTE,
        config.heartbeat_interval(),
        supervisor.as_ref().map(Supervisor::completion),
    )?
    .run(&client)
    .await;

    match supervisor {
        Some(supervisor) => Ok(Some(settle(&client, &registration, &supervisor).await)),
        None => Ok(None),
    }
}

/// Deregister after a clean exit, otherwise mark the check as failing.
async fn settle(
    client: &RegistryClient,
    registration: &Registration,
    supervisor: &Supervisor,
) -> ProcessOutcome {
    // Already published; the heartbeat only stops once it is.
    let outcome = supervisor.wait().await;

    match &outcome.error {
        Some(err) => {
            let note = format!("Command {supervisor} exited with error: {err}");
            match client
                .update_check(&registration.check_id, &note, CheckStatus::Fail)
                .await
            {
                Ok(()) => info!(check_id = %registration.check_id, "check marked failing"),
                Err(e) => error!(
                    check_id = %registration.check_id,
                    error = %e,
                    "failed to mark check failing"
                ),
            }
        }
        None => {
            if let Err(e) = client.deregister(&registration.service_id).await {
                error!(
                    service_id = %registration.service_id,
                    error = %e,
                    "failed to deregister service"
                );
            }
        }
    }

    outcome
}
