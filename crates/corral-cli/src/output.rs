//! Formatted output helpers for CLI commands.
//!
//! Human-readable sizes and the mapping from run outcomes to the
//! process exit status.

use std::process::ExitCode;

use corral_common::constants::BOOTSTRAP_FAILURE_EXIT_CODE;
use corral_common::error::CorralError;

/// Formats a byte count into a human-readable string (e.g., "128 MiB").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Converts a raw status into a process exit code.
///
/// Statuses outside `0..=255` cannot be returned by a process and are
/// reported as 255.
#[must_use]
pub fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(u8::try_from(status).unwrap_or(u8::MAX))
}

/// Status the launcher exits with for a failed command.
///
/// A workload failure keeps the workload's own status; anything else is
/// an infrastructure failure and exits with 125.
#[must_use]
pub fn failure_status(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CorralError>()
        .and_then(CorralError::exit_code)
        .unwrap_or(BOOTSTRAP_FAILURE_EXIT_CODE)
}

/// Logs a failed command and returns the exit code to report.
pub fn report_failure(err: &anyhow::Error) -> ExitCode {
    let workload = err.downcast_ref::<CorralError>().and_then(CorralError::exit_code);
    match workload {
        Some(status) => tracing::info!(status, "container command failed"),
        None => tracing::error!("{err:#}"),
    }
    exit_code(failure_status(err))
}
