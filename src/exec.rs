//! Typed external-process invocation.
//!
//! Every package-manager call, privileged command and download goes through
//! the [`Executor`] trait so that tasks can be exercised in tests with a
//! recording executor instead of touching the host.
use anyhow::{Context as _, Result, bail};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output (empty for interactive runs).
    pub stdout: String,
    /// Captured standard error (empty for interactive runs).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl ExecResult {
    /// A successful result with the given stdout, used by test executors.
    #[must_use]
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over running external programs.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command and capture its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command in a specific directory with extra environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_in_with_env(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult>;

    /// Run a command with the terminal attached (package managers, `sudo`).
    ///
    /// Output is not captured so the operator sees progress and password
    /// prompts. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Resolve `program` to an absolute path on the search path.
    fn resolve(&self, program: &str) -> Option<PathBuf>;

    /// Check if a program is available on the search path.
    fn which(&self, program: &str) -> bool {
        self.resolve(program).is_some()
    }
}

/// Production [`Executor`] backed by [`std::process::Command`].
///
/// Lookups search `PATH` followed by `extra_paths`, so binaries placed into
/// the user-local bin directory earlier in the run are found even though the
/// current process environment predates the shell configuration change.
#[derive(Debug, Default)]
pub struct SystemExecutor {
    extra_paths: Vec<PathBuf>,
}

impl SystemExecutor {
    /// Create an executor that also searches `extra_paths` after `PATH`.
    #[must_use]
    pub const fn with_extra_paths(extra_paths: Vec<PathBuf>) -> Self {
        Self { extra_paths }
    }

    fn search_path(&self) -> Option<OsString> {
        let mut dirs: Vec<PathBuf> = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        dirs.extend(self.extra_paths.iter().cloned());
        std::env::join_paths(dirs).ok()
    }
}

fn command(program: &str, args: &[&str], dir: Option<&Path>) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd
}

/// Capture output; a spawn failure is an error, a non-zero exit is not.
fn capture(cmd: &mut Command) -> Result<ExecResult> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let output = cmd
        .output()
        .with_context(|| format!("could not start {program}"))?;
    Ok(ExecResult::from(output))
}

/// Capture output and turn a non-zero exit into an error carrying stderr.
fn capture_checked(cmd: &mut Command) -> Result<ExecResult> {
    let result = capture(cmd)?;
    if !result.success {
        bail!(
            "{} exited with {}: {}",
            cmd.get_program().to_string_lossy(),
            exit_label(result.code),
            result.stderr.trim()
        );
    }
    Ok(result)
}

fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}"))
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        capture_checked(&mut command(program, args, None))
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        capture_checked(&mut command(program, args, Some(dir)))
    }

    fn run_in_with_env(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult> {
        let mut cmd = command(program, args, Some(dir));
        cmd.envs(env.iter().copied());
        capture_checked(&mut cmd)
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let status = command(program, args, None)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("could not start {program}"))?;
        if !status.success() {
            bail!("{program} exited with {}", exit_label(status.code()));
        }
        Ok(ExecResult {
            success: true,
            code: status.code(),
            ..ExecResult::default()
        })
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        capture(&mut command(program, args, None))
    }

    fn resolve(&self, program: &str) -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        which::which_in(program, self.search_path(), cwd).ok()
    }
}
