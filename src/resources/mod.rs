//! Idempotent resource primitives (check + apply pattern).
pub mod helpers;
pub mod path_entry;
pub mod shell;
pub mod stow;
pub mod symlink;

use anyhow::Result;

/// A piece of host state that can be described and brought into place.
pub trait Applicable {
    /// Human-readable description, used in log lines and dry-run output.
    fn description(&self) -> String;

    /// Bring the resource into its desired state.
    ///
    /// Implementations re-check cheap state themselves and return
    /// [`ResourceChange::AlreadyCorrect`] instead of repeating a change.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written or a privileged command
    /// fails.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource (line in a file, login shell, symlink).
///
/// # Examples
///
/// ```
/// use provision::resources::ResourceState;
///
/// let login = ResourceState::Incorrect { current: "/bin/bash".into() };
/// assert_ne!(login, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g., the symlink target is a real directory).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of [`Applicable::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already in place; nothing was done.
    AlreadyCorrect,
}

/// A resource whose state can be inspected without changing it.
///
/// Tasks check first so that already-correct resources stay silent and
/// dry runs can report exactly what would change.
pub trait Resource: Applicable {
    /// Inspect the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be read (e.g. an unreadable file).
    fn current_state(&self) -> Result<ResourceState>;

    /// Whether [`Applicable::apply`] would change anything.
    ///
    /// [`ResourceState::Invalid`] resources are never changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Resource::current_state`].
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}
