//! GNU Stow packages: restow, falling back to a single adopt.
use anyhow::Result;
use std::path::PathBuf;

use crate::exec::Executor;

/// How a package ended up linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StowOutcome {
    /// `stow --restow` succeeded.
    Linked,
    /// Restow conflicted; `stow --adopt` pulled the existing files into the
    /// tree and linked them. The tree now differs from its repository.
    Adopted,
    /// Both restow and adopt failed; manual intervention is needed.
    Conflict {
        /// Error output of the adopt attempt.
        reason: String,
    },
}

/// One package directory inside a stow tree.
#[derive(Debug)]
pub struct StowPackage<'a> {
    /// The stow tree (`--dir`).
    dir: PathBuf,
    /// Where links are created (`--target`).
    target: PathBuf,
    /// Package directory name.
    package: String,
    /// Executor for running stow.
    executor: &'a dyn Executor,
}

impl<'a> StowPackage<'a> {
    /// Create a package handle.
    #[must_use]
    pub fn new(dir: PathBuf, target: PathBuf, package: String, executor: &'a dyn Executor) -> Self {
        Self {
            dir,
            target,
            package,
            executor,
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} -> {}", self.package, self.target.display())
    }

    /// Whether the package directory exists in the tree.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.dir.join(&self.package).is_dir()
    }

    fn stow(&self, mode: &str) -> Result<crate::exec::ExecResult> {
        let dir = self.dir.to_string_lossy();
        let target = self.target.to_string_lossy();
        self.executor.run_unchecked(
            "stow",
            &[mode, "--dir", &dir, "--target", &target, &self.package],
        )
    }

    /// Link the package.
    ///
    /// Runs `stow --restow`; on failure makes exactly one `stow --adopt`
    /// attempt. Conflicts are reported through [`StowOutcome`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns an error only if `stow` cannot be started.
    pub fn link(&self) -> Result<StowOutcome> {
        let restow = self.stow("--restow")?;
        if restow.success {
            return Ok(StowOutcome::Linked);
        }

        let adopt = self.stow("--adopt")?;
        if adopt.success {
            Ok(StowOutcome::Adopted)
        } else {
            let reason = if adopt.stderr.trim().is_empty() {
                restow.stderr.trim().to_string()
            } else {
                adopt.stderr.trim().to_string()
            };
            Ok(StowOutcome::Conflict { reason })
        }
    }
}
