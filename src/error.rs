//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ProvisionError
//! ├── Platform(PlatformError)   detection, menu selection, unsupported host
//! ├── Install(InstallError)     failed install steps, downloads, checksums
//! ├── Link(LinkError)           dotfiles tree clone/pull
//! └── Config(ConfigError)       config file I/O and parsing
//! ```
//!
//! Every variant here is fatal for the run. Tasks and the command setup wrap
//! the typed errors in [`ProvisionError`] so that `main` can map the failure
//! class to an exit status. Tolerated conditions (a tool unsupported on this
//! platform, a stow conflict) are reported through the run summary instead.

use thiserror::Error;

/// Top-level error type for the provisioning engine.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Platform detection or selection failed.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// A tool installation step failed.
    #[error("Install error: {0}")]
    Install(#[from] InstallError),

    /// The dotfiles tree could not be prepared.
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// The configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ProvisionError {
    /// Process exit status for this failure class. Any other fatal error
    /// exits with 1.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Platform(_) => 2,
            Self::Config(_) => 3,
            Self::Install(_) => 4,
            Self::Link(_) => 5,
        }
    }

    /// Wrap `err` in a [`ProvisionError`] when it is an `E`; otherwise
    /// return it unchanged.
    #[must_use]
    pub fn lift<E>(err: anyhow::Error) -> anyhow::Error
    where
        E: std::error::Error + Send + Sync + 'static,
        Self: From<E>,
    {
        match err.downcast::<E>() {
            Ok(typed) => Self::from(typed).into(),
            Err(err) => err,
        }
    }
}

/// Errors that arise while determining the target platform.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform is known but provisioning is not supported for it.
    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    /// No platform signal matched and no interactive selection was possible.
    #[error("Platform detection failed: {0}")]
    DetectionFailed(String),

    /// The operator entered something other than a listed menu number.
    #[error("Invalid selection '{0}': expected a number from the menu")]
    InvalidSelection(String),
}

/// Errors that arise while installing a tool.
#[derive(Error, Debug)]
pub enum InstallError {
    /// An install step exited non-zero or could not be started.
    #[error("{tool}: step '{step}' failed")]
    StepFailed {
        /// Logical tool name.
        tool: String,
        /// Human-readable description of the failing step.
        step: String,
        /// Underlying error from the executor.
        source: anyhow::Error,
    },

    /// A release asset could not be downloaded.
    #[error("Download failed: {0}")]
    Download(String),

    /// A downloaded asset did not match its published checksum.
    #[error("Checksum mismatch for {asset}: expected {expected}, got {actual}")]
    Checksum {
        /// Asset file name.
        asset: String,
        /// Digest listed in the release checksums file.
        expected: String,
        /// Digest of the downloaded file.
        actual: String,
    },
}

/// Errors that arise while preparing the dotfiles tree.
#[derive(Error, Debug)]
pub enum LinkError {
    /// `git clone` of the dotfiles repository failed.
    #[error("Failed to clone {repo}: {reason}")]
    Clone {
        /// Repository URL.
        repo: String,
        /// Error output.
        reason: String,
    },

    /// `git pull --ff-only` in an existing dotfiles tree failed.
    #[error("Failed to update {dir}: {reason}")]
    Pull {
        /// Local dotfiles directory.
        dir: String,
        /// Error output.
        reason: String,
    },

    /// The dotfiles path exists but is not a directory.
    #[error("Dotfiles path is not a directory: {0}")]
    NotADirectory(String),
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading the config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected schema.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// Path to the offending file.
        path: String,
        /// Underlying parse error.
        source: toml::de::Error,
    },
}
