//! Small file-system operations shared by resources.
use anyhow::{Context as _, Result};
use std::io::ErrorKind;
use std::path::Path;

/// `mkdir -p` for the directory containing `path`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display())),
        _ => Ok(()),
    }
}

/// Delete whatever file or link sits at `path`, dangling links included.
///
/// # Errors
///
/// Returns an error if something is there and cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => {
            Err(e).with_context(|| format!("removing {}", path.display()))
        }
        _ => Ok(()),
    }
}

/// Whether `path` has a line equal to `line`, ignoring surrounding
/// whitespace. A missing file has no lines.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn contains_line(path: &Path, line: &str) -> Result<bool> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let wanted = line.trim();
    Ok(content.lines().any(|l| l.trim() == wanted))
}
