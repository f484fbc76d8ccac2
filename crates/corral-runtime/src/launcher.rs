//! Launcher: re-executes the current binary into fresh namespaces.
//!
//! The new process is created with `clone(2)` so it is PID 1 of its own
//! PID namespace. Before exec it makes its mount table private, then runs
//! `/proc/self/exe __corral-init <command...>` with the configuration in
//! `CORRAL_CONFIG`. Standard streams are inherited unchanged. Setup
//! failures come back on a separate [`status`](crate::status) channel, so
//! every exit status can be passed through as the workload's own.

use std::fs::File;
use std::process::Command;

use corral_common::config::ContainerConfig;
use corral_common::constants::{CONFIG_ENV, INIT_MARKER, SELF_EXE};
use corral_common::error::{CorralError, Result};
use corral_core::namespace::NamespaceConfig;

/// Builds the command that re-invokes this binary in bootstrap mode.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn reexec_command(config: &ContainerConfig) -> Result<Command> {
    let mut command = Command::new(SELF_EXE);
    let _ = command
        .arg(INIT_MARKER)
        .args(&config.command)
        .env(CONFIG_ENV, config.to_json()?);
    Ok(command)
}

/// Interprets the exit status of the bootstrap process.
///
/// `failure` is what the bootstrapper reported on the status channel.
///
/// # Errors
///
/// Returns [`CorralError::BootstrapFailed`] when a failure was reported and
/// [`CorralError::CommandFailed`] for any other non-zero status.
pub fn interpret_exit(code: i32, failure: Option<String>) -> Result<()> {
    match (failure, code) {
        (Some(reason), code) => Err(CorralError::BootstrapFailed { code, reason }),
        (None, 0) => Ok(()),
        (None, code) => Err(CorralError::CommandFailed { code }),
    }
}

/// A started bootstrap process.
#[derive(Debug)]
pub struct Spawned {
    /// PID of the bootstrap process, as seen by the launcher.
    pub pid: u32,
    /// Read end of the status channel.
    pub status: File,
}

/// Starts the bootstrap process in new namespaces.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized or the
/// process cannot be created. No user code has run in either case.
#[cfg(target_os = "linux")]
pub fn spawn(config: &ContainerConfig, namespaces: &NamespaceConfig) -> Result<Spawned> {
    use std::os::fd::{AsFd, AsRawFd};
    use std::os::unix::process::CommandExt;

    use corral_common::constants::{BOOTSTRAP_FAILURE_EXIT_CODE, STATUS_FD_ENV};
    use corral_core::namespace::mount::make_mounts_private;

    use crate::status;

    let (reader, writer) = status::channel()?;
    let mut command = reexec_command(config)?;
    let _ = command.env(STATUS_FD_ENV, writer.as_raw_fd().to_string());
    let private_mounts = namespaces.mount;

    let pid = corral_core::namespace::spawn_in_namespaces(namespaces, || {
        let fail = |reason: String| {
            tracing::error!(%reason, "cannot start bootstrap process");
            let _ = nix::unistd::write(&writer, reason.as_bytes());
            BOOTSTRAP_FAILURE_EXIT_CODE as isize
        };
        if let Err(e) = status::inherit(writer.as_fd()) {
            return fail(format!("status channel: {e}"));
        }
        if private_mounts {
            if let Err(e) = make_mounts_private() {
                return fail(e.to_string());
            }
        }
        let err = command.exec();
        fail(format!("exec {SELF_EXE}: {err}"))
    })?;
    drop(writer);

    let pid =
        u32::try_from(pid.as_raw()).map_err(|_| CorralError::config(format!("invalid pid {pid}")))?;
    Ok(Spawned {
        pid,
        status: reader,
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn spawn(_config: &ContainerConfig, _namespaces: &NamespaceConfig) -> Result<Spawned> {
    Err(CorralError::config(
        "Linux required for native container operations",
    ))
}

/// Blocks until the process `pid` exits and returns its status.
///
/// Death by signal `N` is reported as `128 + N`.
///
/// # Errors
///
/// Returns an error if `waitpid(2)` fails.
#[cfg(target_os = "linux")]
pub fn wait(pid: u32) -> Result<i32> {
    use nix::errno::Errno;
    use nix::sys::wait::{WaitStatus, waitpid};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| CorralError::config(format!("invalid pid {pid}")))?;
    loop {
        match waitpid(Pid::from_raw(raw), None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(128 + signal as i32),
            Ok(_) | Err(Errno::EINTR) => {}
            Err(e) => return Err(CorralError::setup("waitpid", pid, e)),
        }
    }
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn wait(_pid: u32) -> Result<i32> {
    Err(CorralError::config(
        "Linux required for native container operations",
    ))
}
