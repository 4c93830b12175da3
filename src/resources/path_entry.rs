//! A line in a shell startup file.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::PathBuf;

use super::helpers::fs::{contains_line, ensure_parent_dir};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// The `PATH` export that puts `~/.local/bin` first.
pub const LOCAL_BIN_EXPORT: &str = "export PATH=\"$HOME/.local/bin:$PATH\"";

/// A line that must appear exactly once in a startup file.
#[derive(Debug, Clone)]
pub struct PathEntryResource {
    /// Startup file (e.g. `~/.zshrc`).
    pub rc_file: PathBuf,
    /// Line to add.
    pub line: String,
}

impl PathEntryResource {
    /// Create a resource for `line` in `rc_file`.
    #[must_use]
    pub fn new(rc_file: PathBuf, line: impl Into<String>) -> Self {
        Self {
            rc_file,
            line: line.into(),
        }
    }
}

impl Applicable for PathEntryResource {
    fn description(&self) -> String {
        format!("{} in {}", self.line, self.rc_file.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if contains_line(&self.rc_file, &self.line)? {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        ensure_parent_dir(&self.rc_file)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.rc_file)
            .with_context(|| format!("open {}", self.rc_file.display()))?;
        writeln!(file, "\n{}", self.line)
            .with_context(|| format!("append to {}", self.rc_file.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PathEntryResource {
    fn current_state(&self) -> Result<ResourceState> {
        if contains_line(&self.rc_file, &self.line)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
