//! Command Executor: runs the workload inside the finished environment.

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus};

use corral_common::config::ContainerConfig;
use corral_common::error::{CorralError, Result};

/// Runs `config.command[0]` with the remaining elements as arguments.
///
/// Standard streams are inherited. The environment is replaced entirely by
/// `config.environment`; nothing leaks in from the caller's own
/// environment. Blocks until the program exits.
///
/// # Errors
///
/// Returns [`CorralError::Config`] for an empty command or a malformed
/// environment entry (checked before anything is executed),
/// [`CorralError::CommandStart`] if the program cannot be started, and
/// [`CorralError::CommandFailed`] if it exits with a non-zero status.
pub fn run_command(config: &ContainerConfig) -> Result<()> {
    let Some((program, args)) = config.command.split_first() else {
        return Err(CorralError::config("no command specified"));
    };
    let env = config.env_pairs()?;

    tracing::info!(program = %program, args = ?args, "executing command");
    let status = Command::new(program)
        .args(args)
        .env_clear()
        .envs(env)
        .status()
        .map_err(|e| CorralError::CommandStart {
            program: program.clone(),
            source: e,
        })?;

    match exit_code(status) {
        0 => Ok(()),
        code => {
            tracing::info!(code, "command exited unsuccessfully");
            Err(CorralError::CommandFailed { code })
        }
    }
}

/// Maps an exit status to a shell-style code (`128 + N` for signal `N`).
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(command: &[&str], environment: &[&str]) -> ContainerConfig {
        let mut config = ContainerConfig::new(
            command.iter().map(ToString::to_string).collect(),
            "/",
        );
        config.environment = environment.iter().map(ToString::to_string).collect();
        config
    }

    #[test]
    fn empty_command_is_a_config_error() {
        let err = run_command(&config(&[], &[])).unwrap_err();
        assert!(matches!(err, CorralError::Config { .. }));
    }

    #[test]
    fn successful_command_returns_ok() {
        run_command(&config(&["/bin/sh", "-c", "exit 0"], &[])).unwrap();
    }

    #[test]
    fn non_zero_exit_is_propagated() {
        let err = run_command(&config(&["/bin/sh", "-c", "exit 7"], &[])).unwrap_err();
        assert!(matches!(err, CorralError::CommandFailed { code: 7 }));
    }

    #[test]
    fn environment_is_replaced_not_inherited() {
        let script = r#"test "$GREETING" = "hi there" && test -z "$HOME""#;
        run_command(&config(&["/bin/sh", "-c", script], &["GREETING=hi there"])).unwrap();
    }

    #[test]
    fn missing_program_is_a_start_error() {
        let err = run_command(&config(&["/nonexistent/corral-binary"], &[])).unwrap_err();
        assert!(matches!(err, CorralError::CommandStart { .. }));
    }

    #[test]
    fn malformed_environment_is_rejected_before_running() {
        let err = run_command(&config(&["/bin/true"], &["BROKEN"])).unwrap_err();
        assert!(matches!(err, CorralError::Config { .. }));
    }

    #[test]
    fn signal_death_maps_to_128_plus_signal() {
        let status = ExitStatus::from_raw(libc::SIGKILL);
        assert_eq!(exit_code(status), 128 + libc::SIGKILL);
    }
}
