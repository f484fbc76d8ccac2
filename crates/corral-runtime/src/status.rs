//! Setup-failure channel from the bootstrapper to the launcher.
//!
//! The launcher creates a pipe and leaves its write end open across the
//! re-exec, naming the descriptor in `CORRAL_STATUS_FD`. The bootstrapper
//! marks it close-on-exec before anything else, so the workload never
//! holds it, and writes a description of a configuration or setup failure
//! into it. An empty channel means the exit status is the workload's own,
//! whatever its value.

use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::{BorrowedFd, FromRawFd, OwnedFd, RawFd};

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, FdFlag, OFlag, fcntl};

use corral_common::constants::STATUS_FD_ENV;
use corral_common::error::{CorralError, Result};

/// Creates the channel as `(reader, writer)`. Both ends are close-on-exec.
///
/// # Errors
///
/// Returns an error if the pipe cannot be created.
pub fn channel() -> Result<(File, OwnedFd)> {
    let (reader, writer) = nix::unistd::pipe2(OFlag::O_CLOEXEC)
        .map_err(|e| CorralError::setup("pipe", STATUS_FD_ENV, e))?;
    Ok((File::from(reader), writer))
}

/// Keeps `fd` open across the next exec.
///
/// # Errors
///
/// Returns the `fcntl(2)` error.
pub fn inherit(fd: BorrowedFd<'_>) -> nix::Result<()> {
    let _ = fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty()))?;
    Ok(())
}

/// Reads the channel until every writer is gone.
///
/// Returns the reported failure, or `None` if nothing was reported.
///
/// # Errors
///
/// Returns an error if reading fails.
pub fn read_failure(mut reader: File) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let _ = reader
        .read_to_end(&mut buf)
        .map_err(|e| CorralError::setup("read", STATUS_FD_ENV, e))?;
    let reason = String::from_utf8_lossy(&buf);
    let reason = reason.trim();
    Ok((!reason.is_empty()).then(|| reason.to_string()))
}

/// Bootstrapper end of the channel.
#[derive(Debug, Default)]
pub struct StatusReporter {
    file: Option<File>,
}

impl StatusReporter {
    /// Takes over the descriptor named in `CORRAL_STATUS_FD`.
    ///
    /// Without a usable descriptor the reporter silently discards reports.
    pub fn from_env() -> Self {
        let Some(raw) = std::env::var(STATUS_FD_ENV)
            .ok()
            .and_then(|v| v.parse::<RawFd>().ok())
        else {
            return Self::default();
        };
        match adopt(raw) {
            Ok(file) => Self { file: Some(file) },
            Err(e) => {
                tracing::warn!(fd = raw, error = %e, "status channel unusable");
                Self::default()
            }
        }
    }

    /// Sends `reason` to the launcher. Never fails.
    pub fn report(&mut self, reason: &str) {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.write_all(reason.as_bytes()) {
                tracing::debug!(error = %e, "cannot report setup failure");
            }
        }
    }
}

/// Takes ownership of an inherited descriptor and marks it close-on-exec.
#[allow(unsafe_code)]
fn adopt(raw: RawFd) -> nix::Result<File> {
    if raw < 0 {
        return Err(Errno::EBADF);
    }
    // SAFETY: the borrow only lives for the `fcntl` call, which reports
    // EBADF if `raw` is not an open descriptor.
    let borrowed = unsafe { BorrowedFd::borrow_raw(raw) };
    let _ = fcntl(borrowed, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    // SAFETY: `raw` is open, and the launcher passed it to this process for
    // its exclusive use; nothing else here refers to it.
    Ok(unsafe { File::from_raw_fd(raw) })
}
