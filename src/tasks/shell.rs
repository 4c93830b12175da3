//! Login shell setup.
use anyhow::{Context as _, Result, anyhow, bail};
use std::path::{Path, PathBuf};

use super::{Context, Task, TaskResult};
use crate::error::ProvisionError;
use crate::registry::{Outcome, catalog, ensure};
use crate::resources::path_entry::{LOCAL_BIN_EXPORT, PathEntryResource};
use crate::resources::shell::{DefaultShellResource, SHELLS_FILE, ShellsEntryResource};
use crate::resources::{Applicable, Resource, ResourceState};
use crate::summary::RunSummary;

/// Make zsh the login shell, install oh-my-zsh and put `~/.local/bin` on `PATH`.
#[derive(Debug)]
pub struct ConfigureShell;

impl Task for ConfigureShell {
    fn name(&self) -> &'static str {
        "Configure shell"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context, summary: &mut RunSummary) -> Result<TaskResult> {
        configure(ctx, summary, Path::new(SHELLS_FILE))
    }
}

fn tool(name: &str) -> Result<crate::registry::Tool> {
    catalog::find(name).ok_or_else(|| anyhow!("{name} is missing from the tool catalog"))
}

/// Run the shell steps, registering zsh in `shells_file`.
fn configure(ctx: &Context, summary: &mut RunSummary, shells_file: &Path) -> Result<TaskResult> {
    let zsh = tool("zsh")?;
    if ensure(&zsh, ctx, summary).map_err(ProvisionError::from)? == Outcome::Unsupported {
        return Ok(TaskResult::Skipped("zsh cannot be installed here".to_string()));
    }

    match zsh.presence.resolve(ctx) {
        // both steps need sudo, which may prompt for a password
        Some(_) if ctx.ci => ctx.log.info("CI: login shell left unchanged"),
        Some(path) => set_login_shell(ctx, summary, path, shells_file)?,
        None if ctx.dry_run => ctx.log.dry_run("would make zsh the default shell"),
        None => bail!("zsh is not on the search path after installing it"),
    }

    ensure(&tool("oh-my-zsh")?, ctx, summary).map_err(ProvisionError::from)?;
    add_local_bin(ctx)?;

    Ok(if ctx.dry_run {
        TaskResult::DryRun
    } else {
        TaskResult::Ok
    })
}

fn set_login_shell(
    ctx: &Context,
    summary: &mut RunSummary,
    path: PathBuf,
    shells_file: &Path,
) -> Result<()> {
    let entry = ShellsEntryResource::new(path.clone(), shells_file.to_path_buf(), &*ctx.executor);
    if entry.current_state()? == ResourceState::Correct {
        ctx.log.debug(&format!("{} already listed", entry.description()));
    } else if ctx.dry_run {
        ctx.log.dry_run(&format!("would add {}", entry.description()));
    } else {
        entry
            .apply()
            .with_context(|| format!("registering {}", entry.description()))?;
        ctx.log.info(&format!("added {}", entry.description()));
    }

    let login = DefaultShellResource::new(
        path,
        ctx.user.clone(),
        ctx.login_shell.clone(),
        &*ctx.executor,
    );
    match login.current_state()? {
        ResourceState::Correct => {
            ctx.log.info(&format!(
                "default shell already {}",
                login.shell_path().display()
            ));
        }
        _ if ctx.dry_run => {
            ctx.log.dry_run(&format!("would set {}", login.description()));
        }
        _ => {
            login
                .apply()
                .with_context(|| format!("changing {}", login.description()))?;
            ctx.log.info(&format!("set {}", login.description()));
            summary.note("log out and back in for zsh to become your login shell");
        }
    }
    Ok(())
}

fn add_local_bin(ctx: &Context) -> Result<()> {
    let bin = ctx.local_bin();
    let entry = PathEntryResource::new(ctx.home.join(".zshrc"), LOCAL_BIN_EXPORT);
    let needs_entry = entry.needs_change()?;

    if ctx.dry_run {
        if !bin.is_dir() {
            ctx.log.dry_run(&format!("would create {}", bin.display()));
        }
        if needs_entry {
            ctx.log.dry_run(&format!("would add {}", entry.description()));
        }
        return Ok(());
    }

    std::fs::create_dir_all(&bin).with_context(|| format!("creating {}", bin.display()))?;
    if needs_entry {
        entry.apply()?;
        ctx.log.info(&format!("added {}", entry.description()));
    } else {
        ctx.log.debug(&format!("{} already present", entry.description()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::tasks::test_helpers::{RecordingExecutor, RecordingLog, make_context_in};
    use std::sync::Arc;

    struct Fixture {
        home: tempfile::TempDir,
        bin: PathBuf,
        shells: PathBuf,
    }

    /// A home where zsh and oh-my-zsh are already installed.
    fn fixture(shells_content: &str) -> Fixture {
        let home = tempfile::tempdir().unwrap();
        let bin = home.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("zsh"), "").unwrap();
        std::fs::create_dir_all(home.path().join(".oh-my-zsh")).unwrap();
        let shells = home.path().join("shells");
        std::fs::write(&shells, shells_content).unwrap();
        Fixture { home, bin, shells }
    }

    fn context(
        fx: &Fixture,
        executor: &Arc<RecordingExecutor>,
        log: &Arc<RecordingLog>,
        login_shell: PathBuf,
    ) -> Context {
        let mut ctx = make_context_in(Platform::Fedora, executor.clone(), fx.home.path());
        ctx.log = log.clone();
        ctx.login_shell = Some(login_shell);
        ctx
    }

    #[test]
    fn already_configured_shell_logs_once_without_sudo() {
        let fx = fixture("");
        let zsh = fx.bin.join("zsh");
        std::fs::write(&fx.shells, format!("/bin/bash\n{}\n", zsh.display())).unwrap();
        let executor = Arc::new(RecordingExecutor::default().with_search_dir(&fx.bin));
        let log = Arc::new(RecordingLog::default());
        let ctx = context(&fx, &executor, &log, zsh);
        let mut summary = RunSummary::default();

        let result = configure(&ctx, &mut summary, &fx.shells).unwrap();

        assert_eq!(result, TaskResult::Ok);
        let already: Vec<_> = log
            .infos()
            .into_iter()
            .filter(|l| l.starts_with("default shell already"))
            .collect();
        assert_eq!(already.len(), 1);
        assert_eq!(executor.count("sudo"), 0);
        assert!(summary.notes().is_empty());
    }

    #[test]
    fn different_shell_registers_and_changes_login_shell() {
        let fx = fixture("/bin/bash\n");
        let zsh = fx.bin.join("zsh");
        let executor = Arc::new(RecordingExecutor::default().with_search_dir(&fx.bin));
        let log = Arc::new(RecordingLog::default());
        let ctx = context(&fx, &executor, &log, PathBuf::from("/bin/bash"));
        let mut summary = RunSummary::default();

        configure(&ctx, &mut summary, &fx.shells).unwrap();

        assert_eq!(executor.count("sudo sh -c"), 1);
        let chsh = format!("sudo chsh -s {} tester", zsh.display());
        assert_eq!(executor.count(&chsh), 1);
        assert_eq!(summary.notes().len(), 1);
    }

    #[test]
    fn chsh_failure_is_fatal() {
        let fx = fixture("");
        let zsh = fx.bin.join("zsh");
        std::fs::write(&fx.shells, format!("{}\n", zsh.display())).unwrap();
        let executor = Arc::new(
            RecordingExecutor::default()
                .with_search_dir(&fx.bin)
                .failing("sudo chsh"),
        );
        let log = Arc::new(RecordingLog::default());
        let ctx = context(&fx, &executor, &log, PathBuf::from("/bin/bash"));
        let mut summary = RunSummary::default();

        let result = configure(&ctx, &mut summary, &fx.shells);
        assert!(result.is_err());
        assert!(!fx.home.path().join(".zshrc").exists());
    }

    #[test]
    fn path_entry_added_once_across_runs() {
        let fx = fixture("");
        let zsh = fx.bin.join("zsh");
        std::fs::write(&fx.shells, format!("{}\n", zsh.display())).unwrap();
        let executor = Arc::new(RecordingExecutor::default().with_search_dir(&fx.bin));
        let log = Arc::new(RecordingLog::default());
        let ctx = context(&fx, &executor, &log, zsh.clone());

        for _ in 0..2 {
            let mut summary = RunSummary::default();
            configure(&ctx, &mut summary, &fx.shells).unwrap();
        }

        let zshrc = std::fs::read_to_string(fx.home.path().join(".zshrc")).unwrap();
        assert_eq!(zshrc.matches(LOCAL_BIN_EXPORT).count(), 1);
        assert!(fx.home.path().join(".local/bin").is_dir());
    }

    #[test]
    fn dry_run_changes_nothing() {
        let fx = fixture("/bin/bash\n");
        let executor = Arc::new(RecordingExecutor::default().with_search_dir(&fx.bin));
        let log = Arc::new(RecordingLog::default());
        let mut ctx = context(&fx, &executor, &log, PathBuf::from("/bin/bash"));
        ctx.dry_run = true;
        let mut summary = RunSummary::default();

        let result = configure(&ctx, &mut summary, &fx.shells).unwrap();

        assert_eq!(result, TaskResult::DryRun);
        assert!(executor.calls().is_empty());
        assert!(!fx.home.path().join(".zshrc").exists());
        assert!(!log.dry_runs().is_empty());
    }

    #[test]
    fn missing_zsh_is_installed_first() {
        let fx = fixture("");
        std::fs::remove_file(fx.bin.join("zsh")).unwrap();
        let zsh = fx.bin.join("zsh");
        std::fs::write(&fx.shells, format!("{}\n", zsh.display())).unwrap();
        let executor = Arc::new(
            RecordingExecutor::default()
                .with_search_dir(&fx.bin)
                .creating_on("sudo dnf install -y zsh", zsh.clone()),
        );
        let log = Arc::new(RecordingLog::default());
        let ctx = context(&fx, &executor, &log, zsh);
        let mut summary = RunSummary::default();

        configure(&ctx, &mut summary, &fx.shells).unwrap();

        assert_eq!(summary.outcome("zsh"), Some(Outcome::Installed));
        assert_eq!(summary.outcome("oh-my-zsh"), Some(Outcome::AlreadyPresent));
    }

    #[test]
    fn ci_keeps_login_shell_but_still_sets_up_zsh() {
        let fx = fixture("/bin/bash\n");
        let executor = Arc::new(RecordingExecutor::default().with_search_dir(&fx.bin));
        let log = Arc::new(RecordingLog::default());
        let mut ctx = context(&fx, &executor, &log, PathBuf::from("/bin/bash"));
        ctx.ci = true;
        let mut summary = RunSummary::default();

        let result = configure(&ctx, &mut summary, &fx.shells).unwrap();

        assert_eq!(result, TaskResult::Ok);
        assert_eq!(executor.count("sudo"), 0);
        assert_eq!(std::fs::read_to_string(&fx.shells).unwrap(), "/bin/bash\n");
        let zshrc = std::fs::read_to_string(fx.home.path().join(".zshrc")).unwrap();
        assert!(zshrc.contains(LOCAL_BIN_EXPORT));
        assert!(fx.home.path().join(".local/bin").is_dir());
        assert!(log.infos().iter().any(|l| l == "CI: login shell left unchanged"));
    }
}
