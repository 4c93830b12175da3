//! `provision` binary: parses arguments and dispatches to a command.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use provision::cli::{Cli, Command};
use provision::commands;
use provision::error::ProvisionError;
use provision::logging::{self, Log as _, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    // completions and version write to stdout only and keep no log file
    let command = match &args.command {
        Command::Install(_) => "install",
        Command::Detect => "detect",
        Command::List(_) => "list",
        Command::Completions { .. } => "completions",
        Command::Version => "version",
    };
    let log_file = if matches!(args.command, Command::Completions { .. } | Command::Version) {
        None
    } else {
        logging::init_subscriber(args.verbose, command)
    };
    let log = Arc::new(Logger::new(log_file));

    let result = match args.command {
        Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        Command::Detect => {
            commands::detect::run(&args.global, &*log, &mut std::io::stdout())
        }
        Command::List(opts) => commands::list::run(&args.global, &opts, &*log),
        Command::Completions { shell } => {
            commands::completions::run(shell, &mut std::io::stdout());
            Ok(())
        }
        Command::Version => {
            commands::version::run(&mut std::io::stdout()).map_err(anyhow::Error::from)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            e.downcast_ref::<ProvisionError>()
                .map_or(ExitCode::FAILURE, |p| ExitCode::from(p.exit_code()))
        }
    }
}
