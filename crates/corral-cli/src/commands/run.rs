//! `corral run`: Run a command in a new container.

use clap::Args;
use corral_runtime::container::Container;

use super::options::ContainerOptions;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Container options and the command to run.
    #[command(flatten)]
    pub options: ContainerOptions,
}

/// Executes the `run` command.
///
/// Blocks until the command exits. Its standard streams are the
/// terminal's; only logs go to stderr through `tracing`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the container cannot
/// be set up, or the command exits with a non-zero status.
pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = args.options.resolve()?;
    let mut container = Container::new(config);
    container.run()?;
    Ok(())
}
