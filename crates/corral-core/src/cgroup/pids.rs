//! Process-count control via the `pids` controller.
//!
//! Manages `pids.max`, the ceiling on tasks in the group.

use std::path::Path;

use corral_common::constants::PIDS_MAX_FILE;
use corral_common::error::Result;

/// Sets the maximum number of processes for a cgroup.
///
/// Writes the decimal value to `pids.max`; forks beyond it fail with `EAGAIN`.
///
/// # Errors
///
/// Returns an error if writing to `pids.max` fails.
pub fn set_max_procs(cgroup_path: &Path, max_procs: u32) -> Result<()> {
    super::write_control(cgroup_path, PIDS_MAX_FILE, &max_procs.to_string())?;
    tracing::debug!(max_procs, "pids.max set");
    Ok(())
}
