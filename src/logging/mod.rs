//! Console and file logging on top of `tracing`.
//!
//! Commands log through the [`Log`] trait so tasks can be tested against a
//! recording implementation. [`Logger`] forwards to `tracing` and the
//! subscriber from [`init_subscriber`] fans events out to the terminal and
//! to a per-command log file.

mod file;
mod logger;
mod subscriber;

pub use logger::Logger;
pub use subscriber::{LOG_ENV_VAR, init_subscriber};

const STAGE_TARGET: &str = "provision::stage";
const DRY_RUN_TARGET: &str = "provision::dry_run";

/// Sink for user-facing messages.
pub trait Log: Send + Sync {
    /// Section header, printed as `==> msg`.
    fn stage(&self, msg: &str);
    /// Progress line, indented under the current stage.
    fn info(&self, msg: &str);
    /// Hidden on the console unless `--verbose`; always kept in the log file.
    fn debug(&self, msg: &str);
    /// Recoverable problem; the run continues.
    fn warn(&self, msg: &str);
    /// Fatal problem, printed once before exiting non-zero.
    fn error(&self, msg: &str);
    /// A change that would have been made without `--dry-run`.
    fn dry_run(&self, msg: &str);
}

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task ran and finished.
    Ok,
    /// The task's guard said it does not apply (e.g. credentials not requested).
    NotApplicable,
    /// The task decided at run time that it had nothing to do.
    Skipped,
    /// The task only reported what it would change.
    DryRun,
    /// The task returned an error; nothing after it ran.
    Failed,
}

/// One line of the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// Task name as shown in stage headers.
    pub name: String,
    /// How the task ended.
    pub status: TaskStatus,
    /// Skip reason or error text.
    pub message: Option<String>,
}
