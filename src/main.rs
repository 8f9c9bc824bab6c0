//! Web application host
//!
//! Runs one installed web application: prepares the process environment,
//! registers the application with the activity manager and keeps it alive
//! until its main window is closed.

use clap::Parser;
use std::process::ExitCode;
use webapp_host_lib::cli::Cli;
use webapp_host_lib::error::HostError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Err(e) = webapp_host_lib::run(&cli) else {
        return ExitCode::SUCCESS;
    };

    if matches!(e, HostError::Logger(_)) {
        #[allow(clippy::print_stderr, reason = "no logger is installed")]
        {
            eprintln!("{e}");
        }
    } else {
        log::error!("{e}");
    }
    ExitCode::FAILURE
}
