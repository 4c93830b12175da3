//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, remove_existing};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A symlink at `target` pointing to `source`.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// What the symlink points to.
    pub source: PathBuf,
    /// Where the symlink is created.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;
        remove_existing(&self.target)?;
        create_symlink(&self.source, &self.target)
            .with_context(|| format!("linking {}", self.description()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is missing", self.source.display()),
            });
        }
        let Ok(meta) = self.target.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };
        if meta.is_symlink() {
            let points_to = std::fs::read_link(&self.target)
                .with_context(|| format!("reading link {}", self.target.display()))?;
            return Ok(if points_to == self.source {
                ResourceState::Correct
            } else {
                ResourceState::Incorrect {
                    current: points_to.display().to_string(),
                }
            });
        }
        if meta.is_dir() {
            // never replace a real directory
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a directory", self.target.display()),
            });
        }
        Ok(ResourceState::Incorrect {
            current: "a regular file".to_string(),
        })
    }
}

#[cfg(unix)]
fn create_symlink(source: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(not(unix))]
fn create_symlink(_: &Path, _: &Path) -> std::io::Result<()> {
    Err(std::io::ErrorKind::Unsupported.into())
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_then_applied_then_correct() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("fdfind");
        std::fs::write(&source, "").unwrap();
        let target = dir.path().join("bin/fd");
        let link = SymlinkResource::new(source.clone(), target.clone());

        assert_eq!(link.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(link.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(link.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
    }

    #[test]
    fn wrong_link_is_incorrect_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a");
        std::fs::write(&source, "").unwrap();
        let target = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path().join("b"), &target).unwrap();
        let link = SymlinkResource::new(source.clone(), target.clone());

        assert!(matches!(
            link.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
        link.apply().unwrap();
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
    }

    #[test]
    fn missing_source_and_real_directory_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let link = SymlinkResource::new(dir.path().join("nope"), dir.path().join("link"));
        assert!(matches!(
            link.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));

        let source = dir.path().join("bat");
        std::fs::write(&source, "").unwrap();
        std::fs::create_dir(dir.path().join("occupied")).unwrap();
        let link = SymlinkResource::new(source, dir.path().join("occupied"));
        assert!(!link.needs_change().unwrap());
    }

    #[test]
    fn regular_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("batcat");
        std::fs::write(&source, "").unwrap();
        let target = dir.path().join("bat");
        std::fs::write(&target, "old copy").unwrap();
        let link = SymlinkResource::new(source.clone(), target.clone());

        assert!(link.needs_change().unwrap());
        link.apply().unwrap();
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
    }
}
