//! The tool registry: what to install, how, and on which platforms.
//!
//! Every tool is declared once in [`catalog`] with a [`Presence`] and one
//! [`Recipe`] per supported platform (optionally restricted to a range of
//! distribution releases). [`ensure`] is the single idempotent entry point:
//! check presence first, install only when absent.
pub mod catalog;
pub mod release;
pub mod steps;

use std::fmt;

use crate::error::InstallError;
use crate::platform::{Host, Platform};
use crate::presence::Presence;
use crate::summary::RunSummary;
use crate::tasks::Context;

pub use steps::{PackageManager, Step};

/// Install stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Login shell and its framework.
    Shell,
    /// Everyday command-line utilities.
    Core,
    /// Development services and helpers.
    Developer,
    /// Language version managers and toolchains.
    Languages,
    /// Optional credential helper.
    Credentials,
    /// Prompt and shell navigation.
    Prompt,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Self; 6] = [
        Self::Shell,
        Self::Core,
        Self::Developer,
        Self::Languages,
        Self::Credentials,
        Self::Prompt,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell => write!(f, "shell"),
            Self::Core => write!(f, "core"),
            Self::Developer => write!(f, "developer"),
            Self::Languages => write!(f, "languages"),
            Self::Credentials => write!(f, "credentials"),
            Self::Prompt => write!(f, "prompt"),
        }
    }
}

/// Distribution releases a recipe applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseRange {
    /// Every release.
    Any,
    /// Releases strictly below the given number.
    Below(u32),
    /// The given release and newer. An unknown release counts as newer.
    AtLeast(u32),
}

impl ReleaseRange {
    /// Whether `release` falls in this range.
    #[must_use]
    pub fn contains(self, release: Option<u32>) -> bool {
        match self {
            Self::Any => true,
            Self::Below(n) => release.is_some_and(|r| r < n),
            Self::AtLeast(n) => release.is_none_or(|r| r >= n),
        }
    }
}

/// Install procedure for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Platform the steps are written for.
    pub platform: Platform,
    /// Releases of that platform the steps apply to.
    pub releases: ReleaseRange,
    /// Steps executed in order; the first failure aborts the tool.
    pub steps: Vec<Step>,
}

/// A tool the provisioner knows how to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Logical tool name.
    pub name: &'static str,
    /// Stage the tool is installed in.
    pub stage: Stage,
    /// Presence check.
    pub presence: Presence,
    /// Install procedures; the first matching the host wins.
    pub recipes: Vec<Recipe>,
    /// Platforms the tool is relevant on; `None` means all.
    pub applies_to: Option<Vec<Platform>>,
}

impl Tool {
    /// Declare a tool with no recipes.
    #[must_use]
    pub const fn new(name: &'static str, stage: Stage, presence: Presence) -> Self {
        Self {
            name,
            stage,
            presence,
            recipes: Vec::new(),
            applies_to: None,
        }
    }

    /// Add a recipe for every release of `platform`.
    #[must_use]
    pub fn on(self, platform: Platform, steps: Vec<Step>) -> Self {
        self.on_releases(platform, ReleaseRange::Any, steps)
    }

    /// Add a recipe for some releases of `platform`.
    #[must_use]
    pub fn on_releases(
        mut self,
        platform: Platform,
        releases: ReleaseRange,
        steps: Vec<Step>,
    ) -> Self {
        self.recipes.push(Recipe {
            platform,
            releases,
            steps,
        });
        self
    }

    /// Add the same recipe for every supported platform.
    #[must_use]
    pub fn everywhere(self, steps: &[Step]) -> Self {
        Platform::SELECTABLE
            .into_iter()
            .fold(self, |tool, platform| tool.on(platform, steps.to_vec()))
    }

    /// Restrict the tool to `platforms`.
    #[must_use]
    pub fn only_on(mut self, platforms: &[Platform]) -> Self {
        self.applies_to = Some(platforms.to_vec());
        self
    }

    /// Whether the tool is relevant on `platform`.
    #[must_use]
    pub fn applies_to(&self, platform: Platform) -> bool {
        self.applies_to
            .as_ref()
            .is_none_or(|platforms| platforms.contains(&platform))
    }

    /// The recipe for `host`, if any.
    #[must_use]
    pub fn recipe_for(&self, host: &Host) -> Option<&Recipe> {
        self.recipes
            .iter()
            .find(|r| r.platform == host.platform && r.releases.contains(host.release))
    }
}

/// Result of [`ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The install steps ran and succeeded.
    Installed,
    /// The tool was already present; nothing ran.
    AlreadyPresent,
    /// No recipe exists for this host; a warning was recorded.
    Unsupported,
    /// The tool is absent and the steps were only logged.
    DryRun,
}

/// Make sure `tool` is present, installing it if it is absent.
///
/// # Errors
///
/// Returns [`InstallError::StepFailed`] for the first step that fails. An
/// unsupported host is not an error.
pub fn ensure(
    tool: &Tool,
    ctx: &Context,
    summary: &mut RunSummary,
) -> Result<Outcome, InstallError> {
    if tool.presence.is_present(ctx) {
        ctx.log.info(&format!("{} already installed", tool.name));
        summary.record_tool(tool.name, Outcome::AlreadyPresent);
        return Ok(Outcome::AlreadyPresent);
    }

    let Some(recipe) = tool.recipe_for(&ctx.host) else {
        let msg = format!("{}: no install procedure for {}", tool.name, ctx.host);
        ctx.log.warn(&msg);
        summary.warn(msg);
        summary.record_tool(tool.name, Outcome::Unsupported);
        return Ok(Outcome::Unsupported);
    };

    ctx.log.info(&format!("installing {}", tool.name));
    for step in &recipe.steps {
        step.run(ctx, summary)
            .map_err(|source| InstallError::StepFailed {
                tool: tool.name.to_string(),
                step: step.describe(),
                source,
            })?;
    }

    let outcome = if ctx.dry_run {
        Outcome::DryRun
    } else {
        ctx.log.info(&format!("{} installed", tool.name));
        Outcome::Installed
    };
    summary.record_tool(tool.name, outcome);
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{RecordingExecutor, make_context_in};
    use std::sync::Arc;

    fn jq() -> Tool {
        Tool::new("jq", Stage::Core, Presence::bin("jq"))
            .on(Platform::Fedora, vec![Step::packages(PackageManager::Dnf, &["jq"])])
    }

    #[test]
    fn release_range_contains() {
        assert!(ReleaseRange::Any.contains(None));
        assert!(ReleaseRange::Below(42).contains(Some(41)));
        assert!(!ReleaseRange::Below(42).contains(Some(42)));
        assert!(!ReleaseRange::Below(42).contains(None));
        assert!(ReleaseRange::AtLeast(42).contains(Some(42)));
        assert!(ReleaseRange::AtLeast(42).contains(None));
        assert!(!ReleaseRange::AtLeast(42).contains(Some(41)));
    }

    #[test]
    fn recipe_selected_by_release() {
        let tool = Tool::new("lazygit", Stage::Developer, Presence::bin("lazygit"))
            .on_releases(Platform::Fedora, ReleaseRange::Below(42), vec![Step::Note("old")])
            .on_releases(Platform::Fedora, ReleaseRange::AtLeast(42), vec![Step::Note("new")]);
        let old = Host::new(Platform::Fedora, Some(41)).unwrap();
        let new = Host::new(Platform::Fedora, Some(42)).unwrap();
        assert_eq!(tool.recipe_for(&old).unwrap().steps, vec![Step::Note("old")]);
        assert_eq!(tool.recipe_for(&new).unwrap().steps, vec![Step::Note("new")]);
    }

    #[test]
    fn applies_to_defaults_to_all() {
        let tool = jq();
        assert!(tool.applies_to(Platform::MacOs));
        let tool = tool.only_on(&[Platform::Arch]);
        assert!(tool.applies_to(Platform::Arch));
        assert!(!tool.applies_to(Platform::Fedora));
    }

    #[test]
    fn ensure_twice_installs_at_most_once() {
        let home = tempfile::tempdir().unwrap();
        let bin = home.path().join("sysbin");
        let executor = Arc::new(
            RecordingExecutor::default()
                .with_search_dir(&bin)
                .creating_on("sudo dnf install -y jq", bin.join("jq")),
        );
        let ctx = make_context_in(Platform::Fedora, executor.clone(), home.path());
        let mut summary = RunSummary::default();

        assert_eq!(ensure(&jq(), &ctx, &mut summary).unwrap(), Outcome::Installed);
        assert_eq!(
            ensure(&jq(), &ctx, &mut summary).unwrap(),
            Outcome::AlreadyPresent
        );
        assert_eq!(executor.count("sudo dnf install"), 1);
    }

    #[test]
    fn ensure_unsupported_records_warning_and_continues() {
        let home = tempfile::tempdir().unwrap();
        let executor = Arc::new(RecordingExecutor::default());
        let ctx = make_context_in(Platform::MacOs, executor.clone(), home.path());
        let mut summary = RunSummary::default();

        assert_eq!(
            ensure(&jq(), &ctx, &mut summary).unwrap(),
            Outcome::Unsupported
        );
        assert_eq!(summary.warnings().len(), 1);
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn ensure_step_failure_is_fatal() {
        let home = tempfile::tempdir().unwrap();
        let executor = Arc::new(RecordingExecutor::default().failing("sudo dnf install"));
        let ctx = make_context_in(Platform::Fedora, executor, home.path());
        let mut summary = RunSummary::default();

        let err = ensure(&jq(), &ctx, &mut summary).unwrap_err();
        assert!(
            matches!(err, InstallError::StepFailed { ref tool, .. } if tool == "jq"),
            "unexpected error: {err}"
        );
        assert_eq!(summary.outcome("jq"), None);
    }

    #[test]
    fn ensure_dry_run_runs_nothing() {
        let home = tempfile::tempdir().unwrap();
        let executor = Arc::new(RecordingExecutor::default());
        let mut ctx = make_context_in(Platform::Fedora, executor.clone(), home.path());
        ctx.dry_run = true;
        let mut summary = RunSummary::default();

        assert_eq!(ensure(&jq(), &ctx, &mut summary).unwrap(), Outcome::DryRun);
        assert!(executor.calls().is_empty());
    }
}
