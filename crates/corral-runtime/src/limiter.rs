//! Resource Limiter: enrolls the container in a process-count cgroup.
//!
//! Split in two so the caller can take ownership of the node (and thus its
//! eventual removal) before any limit is written.

use std::path::Path;

use corral_common::error::Result;
use corral_core::cgroup::CgroupNode;

/// Creates the cgroup node `<root>/<name>`, reusing an existing one.
///
/// # Errors
///
/// Returns an error if the node cannot be created.
pub fn prepare(root: &Path, name: &str) -> Result<CgroupNode> {
    CgroupNode::create(root, name)
}

/// Writes the process limit, enables release notification, and adds `pid`.
///
/// All three writes are required; the first failure is returned and the
/// remaining writes are skipped.
///
/// # Errors
///
/// Returns an error naming the control file that could not be written.
pub fn enforce(node: &CgroupNode, max_procs: u32, pid: u32) -> Result<()> {
    node.set_max_procs(max_procs)?;
    node.enable_release_notification()?;
    node.add_process(pid)?;
    tracing::info!(
        cgroup = %node.path().display(),
        max_procs,
        pid,
        "process limit enforced"
    );
    Ok(())
}
