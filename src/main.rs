//! dp-cto hook entry point.

use std::io::Read;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use dp_cto::cli::Cli;
use dp_cto::core::error::GuardError;
use dp_cto::core::schemas::{EXIT_PERSIST_FAILURE, LOG_ENV_VAR};

fn setup_logging(verbose: bool) {
    // stdout carries the hook protocol, so logs only ever go to stderr
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}

fn read_stdin() -> String {
    let mut raw = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut raw) {
        warn!(error = %err, "could not read hook input, treating as empty");
        return String::new();
    }
    raw
}

fn run(cli: Cli) -> Result<u8> {
    setup_logging(cli.verbose);
    Ok(dp_cto::run(cli, read_stdin)?)
}

fn main() -> ExitCode {
    // clap's own usage-error exit code is 2, which is reserved for persist failures
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.exit_code() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("dp-cto: {:#}", err);
            let persist = err
                .downcast_ref::<GuardError>()
                .is_some_and(GuardError::is_persist);
            if persist {
                ExitCode::from(EXIT_PERSIST_FAILURE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
