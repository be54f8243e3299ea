//! consulate-supervisor — runs one external command to completion.
//!
//! The command inherits this process's stdin, stdout and stderr. When it
//! exits, its outcome is published through a [`Completion`] that any number
//! of tasks can wait on. The outcome is stored and the waiters are woken in
//! a single step, so a waiter never observes completion without the outcome.
//!
//! # Architecture
//!
//! ```text
//! Supervisor::spawn(args)
//!   ├── background task: run(args, Completer)
//!   │   ├── tokio::process::Command (stdio inherited)
//!   │   └── Completer::complete(ProcessOutcome)   (exactly once)
//!   └── Completion (cloneable)
//!       ├── wait()    → ProcessOutcome
//!       └── outcome() → Option<ProcessOutcome>
//! ```

pub mod completion;
pub mod error;
pub mod supervisor;

pub use completion::{Completer, Completion, ProcessOutcome, completion};
pub use error::CommandError;
pub use supervisor::{Supervisor, run};
