//! Login shell resources: `/etc/shells` registration and the user's default shell.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::helpers::fs::contains_line;
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// The system list of permitted login shells.
pub const SHELLS_FILE: &str = "/etc/shells";

/// A shell path listed in the permitted login shells file.
#[derive(Debug)]
pub struct ShellsEntryResource<'a> {
    /// Absolute path of the shell.
    shell_path: PathBuf,
    /// File listing permitted shells (normally [`SHELLS_FILE`]).
    shells_file: PathBuf,
    /// Executor for the privileged append.
    executor: &'a dyn Executor,
}

impl<'a> ShellsEntryResource<'a> {
    /// Create a new entry resource for `shell_path` in `shells_file`.
    #[must_use]
    pub fn new(shell_path: PathBuf, shells_file: PathBuf, executor: &'a dyn Executor) -> Self {
        Self {
            shell_path,
            shells_file,
            executor,
        }
    }
}

impl Applicable for ShellsEntryResource<'_> {
    fn description(&self) -> String {
        format!(
            "{} in {}",
            self.shell_path.display(),
            self.shells_file.display()
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        let path = self.shell_path.to_string_lossy();
        if contains_line(&self.shells_file, &path)? {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        let file = self.shells_file.to_string_lossy();
        self.executor.run_interactive(
            "sudo",
            &[
                "sh",
                "-c",
                "printf '%s\\n' \"$1\" >> \"$2\"",
                "sh",
                &path,
                &file,
            ],
        )?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ShellsEntryResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if contains_line(&self.shells_file, &self.shell_path.to_string_lossy())? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}

/// The user's default login shell.
#[derive(Debug)]
pub struct DefaultShellResource<'a> {
    /// Absolute path of the desired shell.
    shell_path: PathBuf,
    /// Login name whose shell is changed.
    user: String,
    /// The current login shell (`$SHELL`), if known.
    current: Option<PathBuf>,
    /// Executor for running system commands.
    executor: &'a dyn Executor,
}

impl<'a> DefaultShellResource<'a> {
    /// Create a new default shell resource.
    #[must_use]
    pub fn new(
        shell_path: PathBuf,
        user: String,
        current: Option<PathBuf>,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            shell_path,
            user,
            current,
            executor,
        }
    }

    /// Path of the desired shell.
    #[must_use]
    pub fn shell_path(&self) -> &Path {
        &self.shell_path
    }
}

/// Canonicalise `path`, falling back to the path itself when it cannot be
/// resolved (e.g. it no longer exists).
fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl Applicable for DefaultShellResource<'_> {
    fn description(&self) -> String {
        format!("default shell → {}", self.shell_path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let path = self.shell_path.to_string_lossy();
        self.executor
            .run_interactive("sudo", &["chsh", "-s", &path, &self.user])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DefaultShellResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        match self.current.as_deref() {
            None => Ok(ResourceState::Missing),
            Some(current) if current.as_os_str().is_empty() => Ok(ResourceState::Missing),
            Some(current) if canonical(current) == canonical(&self.shell_path) => {
                Ok(ResourceState::Correct)
            }
            Some(current) => Ok(ResourceState::Incorrect {
                current: current.display().to_string(),
            }),
        }
    }
}
