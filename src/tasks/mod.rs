//! Named, ordered tasks that make up a provisioning run.
mod context;
pub mod dotfiles;
pub mod shell;
pub mod tools;

pub use context::{Context, home_dir, local_bin};

use anyhow::Result;

use crate::logging::TaskStatus;
use crate::summary::RunSummary;

/// Result of running a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed.
    Ok,
    /// Task decided at run time not to do anything.
    Skipped(String),
    /// Task ran in dry-run mode; nothing was changed.
    DryRun,
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task should run on the current platform/configuration.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error on the first fatal failure (a failing install step or
    /// privileged command). Tolerated problems are recorded in `summary`.
    fn run(&self, ctx: &Context, summary: &mut RunSummary) -> Result<TaskResult>;
}

/// The complete set of tasks run by the install command, in order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    let mut tasks: Vec<Box<dyn Task>> = vec![Box::new(shell::ConfigureShell)];
    tasks.extend(tools::InstallStage::all().map(|task| Box::new(task) as Box<dyn Task>));
    tasks.push(Box::new(dotfiles::LinkDotfiles));
    tasks
}

/// Execute a task, recording the result in the summary.
///
/// # Errors
///
/// Returns the task's error after recording it as failed, so that the caller
/// can stop the run. The error itself is reported once, by the caller.
pub fn execute(task: &dyn Task, ctx: &Context, summary: &mut RunSummary) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        summary.record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx, summary) {
        Ok(TaskResult::Ok) => {
            summary.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            summary.record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            summary.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.debug(&format!("{} failed: {e:#}", task.name()));
            summary.record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            return Err(e);
        }
    }
    Ok(())
}
