//! One-shot completion signal carrying a process outcome.

use tokio::sync::watch;

use crate::error::CommandError;

/// Terminal outcome of a supervised command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when the command exited with status 0.
    pub error: Option<CommandError>,
}

impl ProcessOutcome {
    pub fn success() -> Self {
        Self { error: None }
    }

    pub fn failed(error: CommandError) -> Self {
        Self { error: Some(error) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Create a linked completer/completion pair.
pub fn completion() -> (Completer, Completion) {
    let (tx, rx) = watch::channel(None);
    (Completer { tx }, Completion { rx })
}

/// Producing half. Consumed by [`Completer::complete`], so it fires once.
#[derive(Debug)]
pub struct Completer {
    tx: watch::Sender<Option<ProcessOutcome>>,
}

impl Completer {
    /// Store the outcome and wake every waiter.
    pub fn complete(self, outcome: ProcessOutcome) {
        self.tx.send_replace(Some(outcome));
    }
}

/// Observing half. Clone it to give each waiter its own handle.
#[derive(Debug, Clone)]
pub struct Completion {
    rx: watch::Receiver<Option<ProcessOutcome>>,
}

impl Completion {
    /// Wait until the outcome is published.
    ///
    /// Returns immediately once completed, however many times it is called.
    /// If the completer is dropped without publishing, resolves to
    /// [`CommandError::Aborted`].
    pub async fn wait(&mut self) -> ProcessOutcome {
        match self.rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome)
                .clone()
                .unwrap_or_else(|| ProcessOutcome::failed(CommandError::Aborted)),
            Err(_) => ProcessOutcome::failed(CommandError::Aborted),
        }
    }

    /// The outcome, if already published.
    pub fn outcome(&self) -> Option<ProcessOutcome> {
        self.rx.borrow().clone()
    }

    pub fn is_complete(&self) -> bool {
        self.rx.borrow().is_some()
    }
}
