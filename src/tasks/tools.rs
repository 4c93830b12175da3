//! One task per registry stage.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::error::ProvisionError;
use crate::registry::{Stage, catalog, ensure};
use crate::summary::RunSummary;

/// Stages with an install task of their own, in run order.
///
/// Shell tools are installed by [`ConfigureShell`](super::shell::ConfigureShell).
const STAGES: [(Stage, &str); 5] = [
    (Stage::Core, "Install core tools"),
    (Stage::Developer, "Install developer tools"),
    (Stage::Languages, "Install language toolchains"),
    (Stage::Credentials, "Install credential helper"),
    (Stage::Prompt, "Install prompt tools"),
];

/// Ensure every catalog tool of one stage, in catalog order.
#[derive(Debug)]
pub struct InstallStage {
    stage: Stage,
    name: &'static str,
}

impl InstallStage {
    /// One task per installable stage, in run order.
    pub fn all() -> impl Iterator<Item = Self> {
        STAGES
            .into_iter()
            .map(|(stage, name)| Self { stage, name })
    }
}

impl Task for InstallStage {
    fn name(&self) -> &str {
        self.name
    }

    fn should_run(&self, ctx: &Context) -> bool {
        self.stage != Stage::Credentials || ctx.config.credentials
    }

    fn run(&self, ctx: &Context, summary: &mut RunSummary) -> Result<TaskResult> {
        for tool in catalog::by_stage(self.stage) {
            if !tool.applies_to(ctx.platform()) {
                ctx.log
                    .debug(&format!("{}: not applicable on {}", tool.name, ctx.platform()));
                summary.record_not_applicable(tool.name);
                continue;
            }
            ensure(&tool, ctx, summary).map_err(ProvisionError::from)?;
        }

        Ok(if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        })
    }
}
