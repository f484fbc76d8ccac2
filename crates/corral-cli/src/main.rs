//! # corral
//!
//! Runs one command in an isolated environment: its own namespaces, root
//! filesystem, and process-count limit. The same binary is re-executed
//! inside the new namespaces to finish the setup, so the first thing
//! `main` does is find out which of the two roles it plays.

mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use corral_common::constants::LOG_FORMAT_ENV;
use corral_runtime::mode::Mode;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

fn main() -> ExitCode {
    init_tracing();

    match Mode::detect(std::env::args()) {
        Mode::Bootstrap { command } => {
            output::exit_code(corral_runtime::bootstrap::run_from_env(command))
        }
        Mode::Launch => match commands::execute(Cli::parse()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => output::report_failure(&e),
        },
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (default `info`).
///
/// Both roles read the same variables, so the bootstrapper logs exactly
/// like the launcher that started it.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}
