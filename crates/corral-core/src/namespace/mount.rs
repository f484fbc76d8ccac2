//! Mount namespace isolation.
//!
//! A fresh mount namespace still shares propagation with the host when `/`
//! is a shared mount, so the container's mounts are kept private.

use corral_common::error::{CorralError, Result};

/// Marks every mount below `/` as private to the calling mount namespace.
///
/// Mounts made afterwards never propagate back to the host.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn make_mounts_private() -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_REC | MsFlags::MS_PRIVATE,
        None::<&str>,
    )
    .map_err(|e| CorralError::setup("make-private", "/", e))?;
    tracing::debug!("mount propagation set to private");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: mount namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn make_mounts_private() -> Result<()> {
    Err(CorralError::config(
        "Linux required for native container operations",
    ))
}
