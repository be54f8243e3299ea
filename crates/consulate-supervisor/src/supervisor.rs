//! Process supervision.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::completion::{Completer, Completion, ProcessOutcome, completion};
use crate::error::CommandError;

/// A command running in the background.
///
/// Once spawned the command runs to completion; there is no way to cancel
/// it from here.
#[derive(Debug)]
pub struct Supervisor {
    args: Vec<String>,
    completion: Completion,
}

impl Supervisor {
    /// Start `args` (program first) on a background task.
    pub fn spawn(args: Vec<String>) -> Self {
        let (completer, completion) = completion();
        let task_args = args.clone();
        tokio::spawn(async move {
            run(task_args, completer).await;
        });

        Self { args, completion }
    }

    /// A handle that resolves when the command exits.
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    /// The outcome, if the command has exited.
    pub fn outcome(&self) -> Option<ProcessOutcome> {
        self.completion.outcome()
    }

    /// Wait for the command to exit and return its outcome.
    pub async fn wait(&self) -> ProcessOutcome {
        self.completion.clone().wait().await
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl std::fmt::Display for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}

/// Run `args` to completion and publish the outcome through `completer`.
///
/// The outcome is published exactly once, after the process has exited
/// or failed to launch.
pub async fn run(args: Vec<String>, completer: Completer) {
    let outcome = execute(&args).await;
    if let Some(ref error) = outcome.error {
        warn!(command = ?args, %error, "command exited with error");
    } else {
        info!(command = ?args, "command exited successfully");
    }
    completer.complete(outcome);
}

async fn execute(args: &[String]) -> ProcessOutcome {
    let Some((program, rest)) = args.split_first() else {
        return ProcessOutcome::failed(CommandError::Empty);
    };

    debug!(%program, args = ?rest, "launching command");
    let status = Command::new(program)
        .args(rest)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => ProcessOutcome::success(),
        Ok(status) => ProcessOutcome::failed(CommandError::Exited(status.to_string())),
        Err(e) => ProcessOutcome::failed(CommandError::Launch {
            program: program.clone(),
            reason: e.to_string(),
        }),
    }
}
