//! Command: provision the workstation.
use anyhow::Result;
use std::sync::Arc;

use super::CommandSetup;
use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::{Log, Logger};
use crate::summary::RunSummary;
use crate::tasks::{self, Context, Task};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if platform determination or configuration loading
/// fails, or as soon as a task fails. The summary is printed in both the
/// success and the failure case.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("provision {}", super::version::current()));

    let setup = CommandSetup::init(global, &**log)?;
    let ctx = Context::new(
        setup.host,
        Arc::new(setup.config),
        Arc::clone(log) as Arc<dyn Log>,
        setup.executor,
        setup.prompter,
        global.dry_run,
    )?;

    let all_tasks = tasks::all_install_tasks();
    let mut summary = RunSummary::default();
    let result = run_tasks(select_tasks(&all_tasks, opts), &ctx, &mut summary);

    summary.print(&**log, log.log_path());
    result
}

/// Filter tasks by the `--only` and `--skip` name fragments.
///
/// Matching is case-insensitive on a substring of the task name. `--only`
/// wins when both are given.
#[must_use]
pub fn select_tasks<'a>(all: &'a [Box<dyn Task>], opts: &InstallOpts) -> Vec<&'a dyn Task> {
    all.iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !opts.only.is_empty() {
                return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            if !opts.skip.is_empty() {
                return !opts.skip.iter().any(|s| name.contains(&s.to_lowercase()));
            }
            true
        })
        .map(AsRef::as_ref)
        .collect()
}

/// Execute tasks in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first task error.
pub fn run_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    summary: &mut RunSummary,
) -> Result<()> {
    for task in tasks {
        tasks::execute(task, ctx, summary)?;
    }
    Ok(())
}
