//! User configuration (`~/.config/provision/config.toml`).
pub mod packages;
pub mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::platform::Platform;

pub use packages::PackageGroup;

/// Dotfile packages linked on every platform when the config names none.
const DEFAULT_PACKAGES: &[&str] = &["git", "nvim", "tmux", "zsh"];

/// All user configuration. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Install the optional credential helper.
    pub credentials: bool,
    /// Dotfiles tree settings.
    pub dotfiles: DotfilesConfig,
}

/// The `[dotfiles]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotfilesConfig {
    /// Git URL cloned when the tree is absent.
    pub repo: Option<String>,
    /// Location of the tree; `~` expands to the home directory.
    pub dir: String,
    /// Packages linked on every platform.
    pub packages: Vec<String>,
    /// Per-platform extra packages.
    pub platform: PlatformPackages,
}

impl Default for DotfilesConfig {
    fn default() -> Self {
        Self {
            repo: None,
            dir: "~/.dotfiles".to_string(),
            packages: DEFAULT_PACKAGES.iter().map(ToString::to_string).collect(),
            platform: PlatformPackages::default(),
        }
    }
}

/// The `[dotfiles.platform]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformPackages {
    /// Extra packages for macOS.
    pub macos: Vec<String>,
    /// Extra packages for Fedora.
    pub fedora: Vec<String>,
    /// Extra packages for Arch Linux.
    pub arch: Vec<String>,
}

impl Config {
    /// Load configuration from `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }

    /// Default config location: `$XDG_CONFIG_HOME/provision/config.toml`,
    /// falling back to `~/.config/provision/config.toml`.
    #[must_use]
    pub fn default_path(home: &Path) -> PathBuf {
        std::env::var_os("XDG_CONFIG_HOME")
            .map_or_else(|| home.join(".config"), PathBuf::from)
            .join("provision")
            .join("config.toml")
    }

    /// Absolute location of the dotfiles tree.
    #[must_use]
    pub fn dotfiles_dir(&self, home: &Path) -> PathBuf {
        expand_tilde(&self.dotfiles.dir, home)
    }

    /// The dotfile packages as a [`PackageGroup`].
    #[must_use]
    pub fn package_group(&self) -> PackageGroup {
        let extras = &self.dotfiles.platform;
        PackageGroup {
            common: self.dotfiles.packages.clone(),
            platform_extras: vec![
                (Platform::MacOs, extras.macos.clone()),
                (Platform::Fedora, extras.fedora.clone()),
                (Platform::Arch, extras.arch.clone()),
            ],
        }
    }
}

/// Expand a leading `~` to `home`.
#[must_use]
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
