//! Capability checks: is a tool already on this host?
use std::path::PathBuf;

use crate::tasks::Context;

/// How to tell whether a tool is present.
///
/// A tool is present if ANY of `binaries` resolves on the search path
/// (`PATH` plus `~/.local/bin`) or `marker_dir` exists under the home
/// directory. Tools installed as shell functions or into a private prefix
/// (nvm, oh-my-zsh) have no binary and are detected by their marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    /// Accepted executable names, checked in order.
    pub binaries: Vec<&'static str>,
    /// Directory relative to `$HOME` whose existence implies presence.
    pub marker_dir: Option<&'static str>,
}

impl Presence {
    /// Present if `name` resolves.
    #[must_use]
    pub fn bin(name: &'static str) -> Self {
        Self::any_bin(&[name])
    }

    /// Present if any of `names` resolves.
    #[must_use]
    pub fn any_bin(names: &[&'static str]) -> Self {
        Self {
            binaries: names.to_vec(),
            marker_dir: None,
        }
    }

    /// Present if `~/<marker>` exists.
    #[must_use]
    pub const fn dir(marker: &'static str) -> Self {
        Self {
            binaries: Vec::new(),
            marker_dir: Some(marker),
        }
    }

    /// Also accept `~/<marker>` as evidence of presence.
    #[must_use]
    pub fn or_dir(mut self, marker: &'static str) -> Self {
        self.marker_dir = Some(marker);
        self
    }

    /// Whether the tool is present.
    #[must_use]
    pub fn is_present(&self, ctx: &Context) -> bool {
        self.resolve(ctx).is_some()
            || self
                .marker_dir
                .is_some_and(|marker| ctx.home.join(marker).exists())
    }

    /// The first accepted binary that resolves, as an absolute path.
    #[must_use]
    pub fn resolve(&self, ctx: &Context) -> Option<PathBuf> {
        self.binaries
            .iter()
            .find_map(|name| ctx.executor.resolve(name))
    }
}
