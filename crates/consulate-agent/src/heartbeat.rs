//! Heartbeat loop — keeps a TTL check passing.
//!
//! Sends a `pass` update immediately, then once per interval, until the
//! stop signal fires. Update failures are logged and the loop carries on:
//! a registry that is briefly unreachable must not end monitoring.

use std::time::Duration;

use consulate_registry::{CheckStatus, RegistryClient};
use consulate_supervisor::Completion;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::validate_interval;
use crate::error::ConfigError;

/// Note attached to every heartbeat.
pub const HEARTBEAT_NOTE: &str = "Service OK";

/// State owned by one heartbeat loop. Consumed by [`HeartbeatSession::run`].
#[derive(Debug)]
pub struct HeartbeatSession {
    check_id: String,
    note: String,
    interval: Duration,
    /// `None` runs until the process is terminated.
    stop: Option<Completion>,
}

impl HeartbeatSession {
    /// Fails when `interval` is zero or longer than
    /// [`MAX_INTERVAL`](crate::config::MAX_INTERVAL).
    pub fn new(
        check_id: impl Into<String>,
        note: impl Into<String>,
        interval: Duration,
        stop: Option<Completion>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            check_id: check_id.into(),
            note: note.into(),
            interval: validate_interval(interval)?,
            stop,
        })
    }

    /// Run the loop until the stop signal fires.
    pub async fn run(self, client: &RegistryClient) {
        let Self {
            check_id,
            note,
            interval,
            stop,
        } = self;

        info!(%check_id, ?interval, "heartbeat loop started");
        beat(client, &check_id, &note).await;

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stopped = async move {
            match stop {
                Some(mut completion) => {
                    completion.wait().await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(stopped);

        loop {
            tokio::select! {
                biased;
                _ = &mut stopped => {
                    info!(%check_id, "heartbeat loop stopping");
                    break;
                }
                _ = ticker.tick() => {
                    beat(client, &check_id, &note).await;
                }
            }
        }
    }
}

async fn beat(client: &RegistryClient, check_id: &str, note: &str) {
    match client.update_check(check_id, note, CheckStatus::Pass).await {
        Ok(()) => debug!(%check_id, "heartbeat sent"),
        Err(e) => warn!(%check_id, error = %e, "heartbeat failed"),
    }
}
