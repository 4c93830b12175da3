//! Dotfiles tree checkout and stow linking.
use anyhow::Result;
use std::path::Path;

use super::{Context, Task, TaskResult};
use crate::error::{LinkError, ProvisionError};
use crate::resources::stow::{StowOutcome, StowPackage};
use crate::summary::RunSummary;

/// Clone or update the dotfiles tree and stow its packages into `$HOME`.
#[derive(Debug)]
pub struct LinkDotfiles;

impl Task for LinkDotfiles {
    fn name(&self) -> &'static str {
        "Link dotfiles"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context, summary: &mut RunSummary) -> Result<TaskResult> {
        let dir = ctx.config.dotfiles_dir(&ctx.home);

        if dir.exists() {
            if !dir.is_dir() {
                let err = LinkError::NotADirectory(dir.display().to_string());
                return Err(ProvisionError::from(err).into());
            }
            update_tree(ctx, &dir)?;
        } else {
            let Some(repo) = ctx.config.dotfiles.repo.as_deref() else {
                return Ok(TaskResult::Skipped(format!(
                    "{} does not exist and no repository is configured",
                    dir.display()
                )));
            };
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would clone {repo} into {}", dir.display()));
                return Ok(TaskResult::DryRun);
            }
            clone_tree(ctx, repo, &dir).map_err(ProvisionError::from)?;
        }

        if !ctx.dry_run && !ctx.executor.which("stow") {
            let msg = "stow is not installed; dotfiles were not linked".to_string();
            ctx.log.warn(&msg);
            summary.warn(msg);
            return Ok(TaskResult::Skipped("stow is not installed".to_string()));
        }

        link_packages(ctx, &dir, summary)?;

        Ok(if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        })
    }
}

fn clone_tree(ctx: &Context, repo: &str, dir: &Path) -> Result<(), LinkError> {
    let target = dir.to_string_lossy();
    ctx.log.info(&format!("cloning {repo}"));
    ctx.executor
        .run_interactive("git", &["clone", repo, &target])
        .map_err(|e| LinkError::Clone {
            repo: repo.to_string(),
            reason: format!("{e:#}"),
        })?;
    Ok(())
}

fn update_tree(ctx: &Context, dir: &Path) -> Result<()> {
    let question = format!("Pull the latest changes into {}?", dir.display());
    if !ctx.prompter.confirm(&question, true)? {
        ctx.log.debug("leaving dotfiles tree as is");
        return Ok(());
    }
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("would run git pull --ff-only in {}", dir.display()));
        return Ok(());
    }
    ctx.executor
        .run_in(dir, "git", &["pull", "--ff-only"])
        .map_err(|e| {
            ProvisionError::from(LinkError::Pull {
                dir: dir.display().to_string(),
                reason: format!("{e:#}"),
            })
        })?;
    ctx.log.info("dotfiles tree up to date");
    Ok(())
}

fn link_packages(ctx: &Context, dir: &Path, summary: &mut RunSummary) -> Result<()> {
    let group = ctx.config.package_group();
    for name in group.for_platform(ctx.platform()) {
        let package = StowPackage::new(
            dir.to_path_buf(),
            ctx.home.clone(),
            name.to_string(),
            &*ctx.executor,
        );

        if !package.exists() {
            let msg = format!("{name}: no such package in {}", dir.display());
            ctx.log.warn(&msg);
            summary.warn(msg);
            continue;
        }
        if ctx.dry_run {
            ctx.log.dry_run(&format!("would stow {}", package.description()));
            continue;
        }

        match package.link()? {
            StowOutcome::Linked => ctx.log.debug(&format!("linked {}", package.description())),
            StowOutcome::Adopted => {
                ctx.log
                    .info(&format!("{name}: adopted existing files into the tree"));
                summary.note(format!(
                    "review adopted files with `git -C {} diff`",
                    dir.display()
                ));
            }
            StowOutcome::Conflict { reason } => {
                let msg = format!("{name}: stow conflict needs manual attention: {reason}");
                ctx.log.warn(&msg);
                summary.warn(msg);
            }
        }
    }
    Ok(())
}
