//! `furnish` command-line entry point.
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use furnish_cli::cli::{Cli, Command};
use furnish_cli::commands;
use furnish_cli::logging::{self, Log, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if args.command == Command::Version {
        return match commands::version::run(&mut std::io::stdout()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    }

    logging::init_subscriber(args.verbose, args.command.name());
    let logger = Arc::new(Logger::new(args.command.name()));
    let log = Arc::clone(&logger) as Arc<dyn Log>;

    let result = match args.command {
        Command::Apply => commands::apply::run(&args.global, log),
        Command::Debug => {
            commands::debug::run(&args.global, log.as_ref(), &mut std::io::stdout().lock())
        }
        Command::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger.error(&format!("{e:#}"));
            if let Some(path) = logger.log_path() {
                logger.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
            }
            ExitCode::FAILURE
        }
    }
}
