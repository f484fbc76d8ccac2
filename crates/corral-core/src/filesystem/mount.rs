//! Mount utilities for container filesystem setup.
//!
//! Handles mounting and detaching pseudo-filesystems (`proc`, `tmpfs`,
//! `devpts`) inside the container's namespace.

use std::path::{Path, PathBuf};

use corral_common::error::{CorralError, Result};

/// A single pseudo-filesystem mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    /// Source device name (e.g. `"proc"`).
    pub source: String,
    /// Mount point.
    pub target: PathBuf,
    /// Filesystem type passed to `mount(2)`.
    pub fstype: String,
    /// Filesystem-specific options (e.g. `"size=104857600"`).
    pub data: Option<String>,
}

impl MountSpec {
    /// Creates a mount where the source name equals the filesystem type.
    #[must_use]
    pub fn pseudo(fstype: &str, target: impl Into<PathBuf>) -> Self {
        Self {
            source: fstype.to_string(),
            target: target.into(),
            fstype: fstype.to_string(),
            data: None,
        }
    }

    /// Attaches filesystem-specific options.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Mounts `spec` with default flags.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_filesystem(spec: &MountSpec) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        Some(spec.source.as_str()),
        &spec.target,
        Some(spec.fstype.as_str()),
        MsFlags::empty(),
        spec.data.as_deref(),
    )
    .map_err(|e| CorralError::setup("mount", spec.target.display(), e))?;
    tracing::debug!(
        fstype = %spec.fstype,
        target = %spec.target.display(),
        "filesystem mounted"
    );
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: mounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_filesystem(_spec: &MountSpec) -> Result<()> {
    Err(CorralError::config(
        "Linux required for native container operations",
    ))
}

/// Detaches the filesystem mounted at `target`.
///
/// Uses `MNT_DETACH` so a lingering reference does not keep it attached.
///
/// # Errors
///
/// Returns an error if the `umount2(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn unmount(target: &Path) -> Result<()> {
    nix::mount::umount2(target, nix::mount::MntFlags::MNT_DETACH)
        .map_err(|e| CorralError::setup("umount", target.display(), e))?;
    tracing::debug!(target = %target.display(), "filesystem unmounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: unmounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn unmount(_target: &Path) -> Result<()> {
    Err(CorralError::config(
        "Linux required for native container operations",
    ))
}

/// Creates `dir` and its parents if missing.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| CorralError::setup("mkdir", dir.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_mount_uses_fstype_as_source() {
        let spec = MountSpec::pseudo("devpts", "/dev/pts");
        assert_eq!(spec.source, "devpts");
        assert_eq!(spec.fstype, "devpts");
        assert!(spec.data.is_none());
    }

    #[test]
    fn with_data_sets_options() {
        let spec = MountSpec::pseudo("tmpfs", "/tmp").with_data("size=1024");
        assert_eq!(spec.data.as_deref(), Some("size=1024"));
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("dev").join("pts");
        ensure_dir(&target).unwrap();
        ensure_dir(&target).unwrap();
        assert!(target.is_dir());
    }
}
