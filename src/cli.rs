//! Command-line interface definition.
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::platform::Platform;

/// Top-level CLI entry point for the workstation provisioner.
#[derive(Parser, Debug)]
#[command(
    name = "provision",
    about = "Idempotent workstation bootstrap for macOS, Fedora and Arch Linux",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options every subcommand accepts.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Target platform (macos, fedora, arch); skips detection and confirmation
    #[arg(long, global = true)]
    pub platform: Option<Platform>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Override the configuration file location
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Install the credential helper even if the config does not ask for it
    #[arg(long, global = true)]
    pub with_credentials: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision this machine
    Install(InstallOpts),
    /// Print the detected platform
    Detect,
    /// List the tools that would be ensured on a platform
    List(ListOpts),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip specific tasks
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific tasks
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `list` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ListOpts {
    /// Platform to list (defaults to the detected one)
    #[arg(value_name = "PLATFORM")]
    pub target: Option<Platform>,
}
