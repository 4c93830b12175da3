//! Subcommand implementations and their shared setup.
pub mod completions;
pub mod detect;
pub mod install;
pub mod list;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::error::{PlatformError, ProvisionError};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::platform::{self, Host};
use crate::prompt::{AssumeYes, Prompter, TerminalPrompter};
use crate::tasks::{home_dir, local_bin};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform determination and configuration loading so that
/// each command does not have to repeat the boilerplate.
pub struct CommandSetup {
    /// Confirmed platform and release.
    pub host: Host,
    /// Loaded configuration with CLI overrides applied.
    pub config: Config,
    /// Executor searching `PATH` and `~/.local/bin`.
    pub executor: Arc<dyn Executor>,
    /// Terminal prompter, or [`AssumeYes`] under `--yes`.
    pub prompter: Arc<dyn Prompter>,
}

impl std::fmt::Debug for CommandSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSetup")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl CommandSetup {
    /// Determine the platform and load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is unknown, the platform cannot
    /// be determined, or the configuration file fails to parse.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let home = home_dir()?;
        let executor: Arc<dyn Executor> =
            Arc::new(SystemExecutor::with_extra_paths(vec![local_bin(&home)]));
        let prompter: Arc<dyn Prompter> = if global.yes {
            Arc::new(AssumeYes)
        } else {
            Arc::new(TerminalPrompter)
        };

        log.stage("Detecting platform");
        let host = platform::determine(
            global.platform,
            global.yes,
            Path::new("/"),
            &*executor,
            &*prompter,
            log,
        )
        .map_err(ProvisionError::lift::<PlatformError>)?;
        log.info(&format!("platform: {host}"));

        log.stage("Loading configuration");
        let path = global
            .config
            .clone()
            .unwrap_or_else(|| Config::default_path(&home));
        let mut config = Config::load(&path)
            .map_err(ProvisionError::from)
            .with_context(|| format!("loading {}", path.display()))?;
        if global.with_credentials {
            config.credentials = true;
        }
        log.debug(&format!("config: {}", path.display()));
        log.info(&format!(
            "dotfiles tree: {}",
            config.dotfiles_dir(&home).display()
        ));

        Ok(Self {
            host,
            config,
            executor,
            prompter,
        })
    }
}
