//! Global subscriber: coloured console output plus the log file.
use std::fmt;
use std::path::PathBuf;

use tracing::Level;
use tracing::field::{Field, Visit};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::file::{FileLayer, default_path};
use super::{DRY_RUN_TARGET, STAGE_TARGET};

/// Overrides the console filter, in `EnvFilter` syntax (e.g. `debug`).
pub const LOG_ENV_VAR: &str = "PROVISION_LOG";

struct Message(String);

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// The formatted `message` field of an event.
pub(super) fn message(event: &tracing::Event<'_>) -> String {
    let mut visitor = Message(String::new());
    event.record(&mut visitor);
    visitor.0
}

struct Console;

impl<S, N> FormatEvent<S, N> for Console
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let msg = message(event);
        match (*meta.level(), meta.target()) {
            (Level::INFO, STAGE_TARGET) => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            (Level::INFO, DRY_RUN_TARGET) => writeln!(writer, "  \x1b[36m[DRY RUN]\x1b[0m {msg}"),
            (Level::INFO, _) => writeln!(writer, "  {msg}"),
            (Level::WARN, _) => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            (Level::ERROR, _) => writeln!(writer, "\x1b[1;31mERROR\x1b[0m {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the global subscriber for `command`.
///
/// The console shows `info` and up (`debug` with `verbose`) unless
/// [`LOG_ENV_VAR`] is set; warnings and errors go to stderr. The log file
/// always records `debug` and up. Returns the log file path, or `None` if
/// it could not be created, in which case only the console is used.
pub fn init_subscriber(verbose: bool, command: &str) -> Option<PathBuf> {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, filter::LevelFilter};

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);
    let console = tracing_subscriber::fmt::layer()
        .event_format(Console)
        .with_writer(writer)
        .with_filter(filter);

    let path = default_path(command);
    let file = path
        .as_deref()
        .and_then(|p| FileLayer::create(p, command).ok())
        .map(|layer| layer.with_filter(LevelFilter::DEBUG));
    let log_file = file.as_ref().and(path);

    tracing_subscriber::registry().with(console).with(file).init();
    log_file
}
