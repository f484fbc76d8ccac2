//! OS seam used by the isolation bootstrapper.
//!
//! Every step that changes process-wide state (hostname, root, working
//! directory, mount table) goes through [`IsolationBackend`], so the
//! bootstrap sequence can be driven against a recording fake in tests.

pub mod linux;

use std::path::Path;

use corral_common::error::Result;
use corral_core::filesystem::mount::MountSpec;

/// Process-wide isolation operations performed by the bootstrapper.
pub trait IsolationBackend {
    /// Sets the hostname inside the UTS namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the hostname cannot be set.
    fn set_hostname(&self, hostname: &str) -> Result<()>;

    /// Makes `rootfs` the root directory of the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be changed.
    fn change_root(&self, rootfs: &Path) -> Result<()>;

    /// Changes the working directory, resolved against the current root.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be entered.
    fn change_dir(&self, dir: &Path) -> Result<()>;

    /// Creates a directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir(&self, dir: &Path) -> Result<()>;

    /// Mounts a filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the mount fails.
    fn mount(&self, spec: &MountSpec) -> Result<()>;

    /// Detaches the filesystem mounted at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unmount fails.
    fn unmount(&self, target: &Path) -> Result<()>;
}
