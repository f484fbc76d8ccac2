//! `corral plan`: Display the resolved container configuration.

use clap::Args;
use corral_common::config::ContainerConfig;

use super::options::ContainerOptions;
use crate::output::format_bytes;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Print the configuration as JSON (the format `--config` accepts).
    #[arg(long)]
    pub json: bool,

    /// Container options and the command that would run.
    #[command(flatten)]
    pub options: ContainerOptions,
}

/// Executes the `plan` command.
///
/// Resolves and validates the configuration, then prints it. Nothing is
/// created on the host, and nothing is printed for an invalid plan.
///
/// # Errors
///
/// Returns an error if the configuration cannot be resolved or is invalid.
pub fn execute(args: PlanArgs) -> anyhow::Result<()> {
    let config = args.options.resolve()?;
    config.validate()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print_plan(&config);
    }
    Ok(())
}

fn print_plan(config: &ContainerConfig) {
    println!("Container plan");
    println!("{}", "\u{2550}".repeat(35));
    println!();
    println!("  command:   {}", config.command.join(" "));
    println!("  rootfs:    {}", config.rootfs_path.display());
    println!("  hostname:  {}", config.hostname);
    println!("  workdir:   {}", config.working_dir.display());
    println!(
        "  cgroup:    {} (max {} processes)",
        config.cgroup_root.join(&config.cgroup_name).display(),
        config.max_procs
    );
    println!("  /tmp:      {}", format_bytes(config.tmp_size_bytes));
    println!("  env:");
    for entry in &config.environment {
        println!("    {entry}");
    }
}
