//! Workstation provisioning engine.
//!
//! Brings a macOS, Fedora or Arch Linux machine to a known developer
//! baseline: zsh as the login shell, a catalog of CLI tools installed through
//! each platform's package manager, and a dotfiles tree linked into `$HOME`
//! with GNU Stow. Every step checks before it acts, so re-running is safe.
//!
//! The public API is organised into layers:
//!
//! - **[`platform`]** and **[`config`]**: what machine this is and what the
//!   operator asked for
//! - **[`presence`]** and **[`registry`]**: whether a tool is present and how to
//!   install it on each platform
//! - **[`resources`]**: idempotent `check + apply` primitives (login shell,
//!   startup-file lines, symlinks, stow packages)
//! - **[`tasks`]**: named units of work wired to resources and the registry
//! - **[`commands`]**: top-level subcommand orchestration (`install`,
//!   `detect`, `list`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod presence;
pub mod prompt;
pub mod registry;
pub mod resources;
pub mod summary;
pub mod tasks;
