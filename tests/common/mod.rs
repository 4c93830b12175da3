// Shared helpers for integration tests.
//
// Provides a fake host (temporary home plus a directory of stub binaries),
// a recording executor that resolves programs from that directory, and a
// context factory, so each integration test can drive tasks end to end
// without touching the real machine.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use provision::config::Config;
use provision::exec::{ExecResult, Executor};
use provision::logging::Log;
use provision::platform::{Host, Platform};
use provision::prompt::AssumeYes;
use provision::tasks::Context;

/// Executor that records command lines and installs stub binaries.
///
/// A command line starting with an `installs` prefix creates the paired file
/// in the stub bin directory, so a later presence check finds the "installed" tool.
#[derive(Debug, Default)]
pub struct FakeHost {
    calls: Mutex<Vec<String>>,
    installs: Vec<(String, PathBuf)>,
    failures: Vec<String>,
    search_dirs: Vec<PathBuf>,
}

impl FakeHost {
    /// Resolve programs from `dirs`, in order.
    pub fn new(dirs: &[&Path]) -> Self {
        Self {
            search_dirs: dirs.iter().map(|d| d.to_path_buf()).collect(),
            ..Self::default()
        }
    }

    /// Create `path` whenever a command starting with `prefix` runs.
    pub fn installs(mut self, prefix: &str, path: PathBuf) -> Self {
        self.installs.push((prefix.to_string(), path));
        self
    }

    /// Fail commands starting with `prefix`.
    pub fn failing(mut self, prefix: &str) -> Self {
        self.failures.push(prefix.to_string());
        self
    }

    /// Recorded command lines.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Number of recorded command lines starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, program: &str, args: &[&str]) -> ExecResult {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().expect("calls lock").push(line.clone());

        if self.failures.iter().any(|p| line.starts_with(p.as_str())) {
            return ExecResult {
                stdout: String::new(),
                stderr: format!("{line}: exit status 1"),
                success: false,
                code: Some(1),
            };
        }
        for (prefix, path) in &self.installs {
            if line.starts_with(prefix.as_str()) {
                std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
                std::fs::write(path, "").expect("write stub binary");
            }
        }
        ExecResult::ok("")
    }

    fn checked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.record(program, args);
        anyhow::ensure!(result.success, "{}", result.stderr);
        Ok(result)
    }
}

impl Executor for FakeHost {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_in(&self, _: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_in_with_env(
        &self,
        _: &Path,
        program: &str,
        args: &[&str],
        _: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.record(program, args))
    }

    fn resolve(&self, program: &str) -> Option<PathBuf> {
        self.search_dirs
            .iter()
            .map(|d| d.join(program))
            .find(|p| p.exists())
    }
}

/// Logger that discards everything.
#[derive(Debug, Default)]
pub struct QuietLog;

impl Log for QuietLog {
    fn stage(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn debug(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn error(&self, _: &str) {}
    fn dry_run(&self, _: &str) {}
}

/// A temporary home with a stub bin directory.
pub struct TestHome {
    /// Temporary directory used as `$HOME`.
    pub home: tempfile::TempDir,
}

impl TestHome {
    /// Create an empty home with `bin/` and `.local/bin/`.
    pub fn new() -> Self {
        let home = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(home.path().join("bin")).expect("create bin");
        std::fs::create_dir_all(home.path().join(".local/bin")).expect("create local bin");
        Self { home }
    }

    /// Home directory path.
    pub fn path(&self) -> &Path {
        self.home.path()
    }

    /// Directory of stub system binaries.
    pub fn bin(&self) -> PathBuf {
        self.home.path().join("bin")
    }

    /// The user-local bin directory.
    pub fn local_bin(&self) -> PathBuf {
        self.home.path().join(".local/bin")
    }

    /// Place empty stub binaries for `names` in [`Self::bin`].
    pub fn with_binaries(self, names: &[&str]) -> Self {
        for name in names {
            std::fs::write(self.bin().join(name), "").expect("write stub binary");
        }
        self
    }

    /// A [`FakeHost`] that searches the stub bin and the user-local bin.
    pub fn executor(&self) -> FakeHost {
        FakeHost::new(&[&self.bin(), &self.local_bin()])
    }

    /// Build a run context for `platform` at `release`.
    pub fn context(
        &self,
        platform: Platform,
        release: Option<u32>,
        executor: Arc<dyn Executor>,
    ) -> Context {
        Context {
            host: Host::new(platform, release).expect("supported platform"),
            config: Arc::new(Config::default()),
            log: Arc::new(QuietLog),
            executor,
            prompter: Arc::new(AssumeYes),
            home: self.home.path().to_path_buf(),
            user: "tester".to_string(),
            login_shell: None,
            ci: false,
            dry_run: false,
        }
    }
}
