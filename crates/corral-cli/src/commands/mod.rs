//! CLI command definitions and dispatch.

pub mod options;
pub mod plan;
pub mod run;

use clap::{Parser, Subcommand};

/// corral: run a command in an isolated, process-limited environment.
#[derive(Parser, Debug)]
#[command(name = "corral", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command inside a new container and wait for it.
    Run(run::RunArgs),
    /// Show the resolved container configuration without running anything.
    Plan(plan::PlanArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => run::execute(args),
        Command::Plan(args) => plan::execute(args),
    }
}
