//! Shared state handed to every task.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::{Host, Platform};
use crate::prompt::Prompter;

/// Shared context for task execution.
///
/// Built once after the platform is confirmed and passed by reference to
/// every task; nothing in it changes during a run.
pub struct Context {
    /// Confirmed platform and release.
    pub host: Host,
    /// User configuration.
    pub config: Arc<Config>,
    /// Logger for console and file output.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Source of answers to interactive questions.
    pub prompter: Arc<dyn Prompter>,
    /// User's home directory path.
    pub home: PathBuf,
    /// Login name of the user being provisioned.
    pub user: String,
    /// Login shell the user started with (`$SHELL`).
    pub login_shell: Option<PathBuf>,
    /// Running under CI (`CI` set); the login shell is left alone there.
    pub ci: bool,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("prompter", &"<dyn Prompter>")
            .field("home", &self.home)
            .field("user", &self.user)
            .field("login_shell", &self.login_shell)
            .field("ci", &self.ci)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is not set, or if neither `USER` nor
    /// `LOGNAME` is set.
    pub fn new(
        host: Host,
        config: Arc<Config>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        prompter: Arc<dyn Prompter>,
        dry_run: bool,
    ) -> Result<Self> {
        let home = home_dir()?;
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .map_err(|_| anyhow!("neither USER nor LOGNAME environment variable is set"))?;
        Ok(Self {
            host,
            config,
            log,
            executor,
            prompter,
            home,
            user,
            login_shell: std::env::var_os("SHELL").map(PathBuf::from),
            ci: std::env::var_os("CI").is_some(),
            dry_run,
        })
    }

    /// The confirmed platform.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.host.platform
    }

    /// The user-local bin directory (`~/.local/bin`).
    #[must_use]
    pub fn local_bin(&self) -> PathBuf {
        local_bin(&self.home)
    }

    /// Expand `$HOME` and `$USER` placeholders in a command argument.
    #[must_use]
    pub fn expand(&self, arg: &str) -> String {
        arg.replace("$HOME", &self.home.to_string_lossy())
            .replace("$USER", &self.user)
    }
}

/// Read the home directory from `HOME`.
///
/// # Errors
///
/// Returns an error if `HOME` is not set.
pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("HOME environment variable is not set"))
}

/// The user-local bin directory under `home`.
#[must_use]
pub fn local_bin(home: &std::path::Path) -> PathBuf {
    home.join(".local").join("bin")
}
