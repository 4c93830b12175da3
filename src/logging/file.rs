//! The per-command log file.
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;

use super::{DRY_RUN_TARGET, STAGE_TARGET};

/// `$XDG_CACHE_HOME/provision/<command>.log`, falling back to
/// `~/.cache`. Creates the directory; `None` if that fails.
pub(super) fn default_path(command: &str) -> Option<PathBuf> {
    let cache = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))?;
    let dir = cache.join("provision");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Remove CSI escape sequences (`ESC [ ... final-byte`) and lone escapes.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next_if_eq(&'[').is_some() {
            for inner in chars.by_ref() {
                if ('@'..='~').contains(&inner) {
                    break;
                }
            }
        } else {
            chars.next();
        }
    }
    out
}

/// Layer that appends every event to the log file, timestamped and uncoloured.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate `path` and write a run header.
    pub(super) fn create(path: &Path, command: &str) -> io::Result<Self> {
        let mut file = fs::File::create(path)?;
        writeln!(
            file,
            "# provision {} {command} started {} UTC",
            crate::commands::version::current(),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
        )?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

fn tag(level: Level, target: &str) -> &'static str {
    match (level, target) {
        (Level::INFO, STAGE_TARGET) => "==> ",
        (Level::INFO, DRY_RUN_TARGET) => "    [dry run] ",
        (Level::INFO, _) => "    ",
        (Level::WARN, _) => "    [warn] ",
        (Level::ERROR, _) => "    [error] ",
        _ => "    [debug] ",
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _: tracing_subscriber::layer::Context<'_, S>) {
        let meta = event.metadata();
        let line = format!(
            "[{}] {}{}",
            chrono::Utc::now().format("%H:%M:%S"),
            tag(*meta.level(), meta.target()),
            strip_ansi(&super::subscriber::message(event)),
        );
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}
