//! Install steps and how each one is executed.
use anyhow::{Context as _, Result, bail};
use std::fmt;
use std::path::Path;

use super::release;
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable as _, Resource as _, ResourceState};
use crate::summary::RunSummary;
use crate::tasks::Context;

/// Default number of parallel jobs for makepkg if nproc detection fails.
const DEFAULT_NPROC: &str = "4";

/// AUR helpers accepted for [`PackageManager::Aur`], in preference order.
pub const AUR_HELPERS: &[&str] = &["paru", "yay"];

/// Native package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Homebrew formulae.
    Brew,
    /// Homebrew casks.
    BrewCask,
    /// Fedora dnf.
    Dnf,
    /// Arch pacman.
    Pacman,
    /// Arch User Repository through `paru` or `yay`.
    Aur,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brew => write!(f, "brew"),
            Self::BrewCask => write!(f, "brew cask"),
            Self::Dnf => write!(f, "dnf"),
            Self::Pacman => write!(f, "pacman"),
            Self::Aur => write!(f, "aur"),
        }
    }
}

/// One action in an install recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Install packages with a native package manager.
    Packages {
        /// Manager to use.
        manager: PackageManager,
        /// Package names.
        names: Vec<&'static str>,
    },
    /// Run a command; `$USER` and `$HOME` in arguments are expanded.
    Command {
        /// Program to run.
        program: &'static str,
        /// Arguments.
        args: Vec<&'static str>,
    },
    /// Pipe an upstream install script into a shell.
    Script {
        /// Script URL.
        url: &'static str,
        /// Interpreter the script is piped into (`sh` or `bash`).
        shell: &'static str,
        /// Arguments passed to the script.
        args: Vec<&'static str>,
    },
    /// Link `~/.local/bin/<alias>` to the resolved `target` binary when
    /// `alias` does not resolve on its own.
    LinkAlias {
        /// Name the tool is expected under.
        alias: &'static str,
        /// Name the distribution installed it as.
        target: &'static str,
    },
    /// Build and install an AUR package with makepkg.
    BuildFromAur {
        /// AUR package name.
        package: &'static str,
    },
    /// Install a binary from the latest GitHub release into `~/.local/bin`.
    GithubRelease {
        /// `owner/name` of the repository.
        repo: &'static str,
        /// Asset file name; `{version}` and `{arch}` are substituted.
        asset: &'static str,
        /// Binary extracted from the asset.
        binary: &'static str,
    },
    /// Record a manual follow-up for the operator.
    Note(&'static str),
}

impl Step {
    /// Shorthand for [`Step::Packages`].
    #[must_use]
    pub fn packages(manager: PackageManager, names: &[&'static str]) -> Self {
        Self::Packages {
            manager,
            names: names.to_vec(),
        }
    }

    /// Shorthand for [`Step::Command`].
    #[must_use]
    pub fn command(program: &'static str, args: &[&'static str]) -> Self {
        Self::Command {
            program,
            args: args.to_vec(),
        }
    }

    /// Shorthand for [`Step::Script`].
    #[must_use]
    pub fn script(url: &'static str, shell: &'static str, args: &[&'static str]) -> Self {
        Self::Script {
            url,
            shell,
            args: args.to_vec(),
        }
    }

    /// One-line description used in logs and error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Packages { manager, names } => {
                let (program, args) = package_command(*manager, "<aur-helper>");
                format!("{program} {} {}", args.join(" "), names.join(" "))
            }
            Self::Command { program, args } => std::iter::once(*program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" "),
            Self::Script { url, shell, .. } => format!("curl -fsSL {url} | {shell}"),
            Self::LinkAlias { alias, target } => format!("link {alias} -> {target}"),
            Self::BuildFromAur { package } => format!("build {package} from AUR"),
            Self::GithubRelease { repo, binary, .. } => {
                format!("install {binary} from {repo} releases")
            }
            Self::Note(text) => format!("note: {text}"),
        }
    }

    /// Execute the step.
    ///
    /// In dry-run mode only notes are recorded; every other step is logged
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying command fails.
    pub fn run(&self, ctx: &Context, summary: &mut RunSummary) -> Result<()> {
        if let Self::Note(text) = self {
            summary.note(*text);
            return Ok(());
        }
        if ctx.dry_run {
            ctx.log.dry_run(&self.describe());
            return Ok(());
        }
        ctx.log.debug(&format!("step: {}", self.describe()));

        match self {
            Self::Packages { manager, names } => install_packages(ctx, *manager, names),
            Self::Command { program, args } => {
                let expanded: Vec<String> = args.iter().map(|a| ctx.expand(a)).collect();
                let args: Vec<&str> = expanded.iter().map(String::as_str).collect();
                ctx.executor.run_interactive(&ctx.expand(program), &args)?;
                Ok(())
            }
            Self::Script { url, shell, args } => run_script(ctx, url, shell, args),
            Self::LinkAlias { alias, target } => link_alias(ctx, alias, target),
            Self::BuildFromAur { package } => build_from_aur(ctx, package),
            Self::GithubRelease {
                repo,
                asset,
                binary,
            } => release::install(ctx, repo, asset, binary),
            Self::Note(_) => Ok(()),
        }
    }
}

/// The program and leading arguments for installing with `manager`.
fn package_command(manager: PackageManager, aur_helper: &str) -> (String, Vec<&'static str>) {
    match manager {
        PackageManager::Brew => ("brew".to_string(), vec!["install"]),
        PackageManager::BrewCask => ("brew".to_string(), vec!["install", "--cask"]),
        PackageManager::Dnf => ("sudo".to_string(), vec!["dnf", "install", "-y"]),
        PackageManager::Pacman => (
            "sudo".to_string(),
            vec!["pacman", "-S", "--needed", "--noconfirm"],
        ),
        PackageManager::Aur => (
            aur_helper.to_string(),
            vec!["-S", "--needed", "--noconfirm"],
        ),
    }
}

fn install_packages(ctx: &Context, manager: PackageManager, names: &[&'static str]) -> Result<()> {
    let helper = if manager == PackageManager::Aur {
        AUR_HELPERS
            .iter()
            .copied()
            .find(|h| ctx.executor.which(h))
            .context("no AUR helper (paru or yay) found")?
    } else {
        ""
    };
    let (program, mut args) = package_command(manager, helper);
    args.extend_from_slice(names);
    ctx.executor
        .run_interactive(&program, &args)
        .with_context(|| format!("installing {} with {manager}", names.join(" ")))?;
    Ok(())
}

fn run_script(ctx: &Context, url: &str, shell: &str, args: &[&str]) -> Result<()> {
    let mut pipeline = format!("curl -fsSL {url} | {shell}");
    if !args.is_empty() {
        let expanded: Vec<String> = args.iter().map(|a| ctx.expand(a)).collect();
        pipeline.push_str(" -s -- ");
        pipeline.push_str(&expanded.join(" "));
    }
    ctx.executor
        .run_interactive("sh", &["-c", &pipeline])
        .with_context(|| format!("running install script {url}"))?;
    Ok(())
}

fn link_alias(ctx: &Context, alias: &str, target: &str) -> Result<()> {
    if let Some(existing) = ctx.executor.resolve(alias) {
        ctx.log
            .debug(&format!("{alias} already resolves to {}", existing.display()));
        return Ok(());
    }
    let Some(source) = ctx.executor.resolve(target) else {
        bail!("{target} not found after install; cannot link {alias}");
    };

    let link = SymlinkResource::new(source, ctx.local_bin().join(alias));
    match link.current_state()? {
        ResourceState::Correct => {}
        ResourceState::Invalid { reason } => bail!("cannot link {alias}: {reason}"),
        ResourceState::Missing | ResourceState::Incorrect { .. } => {
            link.apply()?;
            ctx.log.info(&format!("linked {}", link.description()));
        }
    }
    Ok(())
}

fn build_from_aur(ctx: &Context, package: &str) -> Result<()> {
    for dep in ["git", "makepkg", "sudo"] {
        if !ctx.executor.which(dep) {
            bail!("{dep} is required to build {package}");
        }
    }

    let tmp = std::env::temp_dir().join(format!("{package}-build"));
    if tmp.exists() {
        ctx.log
            .debug(&format!("removing previous build directory {}", tmp.display()));
        std::fs::remove_dir_all(&tmp).context("removing previous build directory")?;
    }

    let result = clone_and_build(ctx, package, &tmp);
    std::fs::remove_dir_all(&tmp).ok();
    result
}

fn clone_and_build(ctx: &Context, package: &str, tmp: &Path) -> Result<()> {
    let url = format!("https://aur.archlinux.org/{package}.git");
    ctx.executor
        .run("git", &["clone", &url, &tmp.to_string_lossy()])
        .with_context(|| format!("cloning {package} from AUR"))?;

    let nproc = ctx.executor.run("nproc", &[]).map_or_else(
        |_| DEFAULT_NPROC.to_string(),
        |r| r.stdout.trim().to_string(),
    );
    let makeflags = format!("-j{nproc}");
    ctx.log.debug(&format!("building with MAKEFLAGS={makeflags}"));
    ctx.executor
        .run_in_with_env(
            tmp,
            "makepkg",
            &["-si", "--noconfirm"],
            &[("MAKEFLAGS", &makeflags)],
        )
        .with_context(|| format!("building {package} with makepkg"))?;
    Ok(())
}
