//! Root filesystem switching via `chroot(2)`.
//!
//! Runs inside a private mount namespace, so the old root stays reachable
//! only through descriptors opened before the change.

use std::path::Path;

use corral_common::error::{CorralError, Result};

/// Makes `rootfs` the root directory of the calling process.
///
/// # Errors
///
/// Returns an error if `chroot(2)` fails, for instance when `rootfs` does
/// not exist or is not a directory.
pub fn change_root(rootfs: &Path) -> Result<()> {
    nix::unistd::chroot(rootfs)
        .map_err(|e| CorralError::setup("chroot", rootfs.display(), e))?;
    tracing::info!(rootfs = %rootfs.display(), "root filesystem changed");
    Ok(())
}

/// Changes the working directory, resolved against the current root.
///
/// # Errors
///
/// Returns an error if `chdir(2)` fails.
pub fn change_dir(dir: &Path) -> Result<()> {
    nix::unistd::chdir(dir).map_err(|e| CorralError::setup("chdir", dir.display(), e))?;
    tracing::debug!(dir = %dir.display(), "working directory changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_root_into_missing_directory_is_a_setup_error() {
        let err = change_root(Path::new("/nonexistent/corral/rootfs")).unwrap_err();
        assert!(matches!(err, CorralError::Setup { operation: "chroot", .. }));
    }
}
