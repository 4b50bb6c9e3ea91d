//! Application entry point.
//!
//! Parses command-line arguments, installs logging, and delegates execution
//! to [`runner::run`].

use clap::Parser;
use mockable::DefaultEnv;
use sg_configure::{cli::Cli, runner};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.exit_code() == 0 {
                0
            } else {
                runner::USAGE_EXIT_CODE
            };
            err.print().ok();
            return ExitCode::from(code);
        }
    };
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    fmt()
        .with_writer(std::io::stderr)
        .with_max_level(max_level)
        .init();
    match runner::run(&cli, &DefaultEnv::new()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "configure failed");
            ExitCode::from(runner::exit_code(&err))
        }
    }
}
