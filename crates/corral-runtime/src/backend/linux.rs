//! Linux backend delegating to the `corral-core` syscall wrappers.

use std::path::Path;

use corral_common::error::Result;
use corral_core::filesystem::{chroot, mount};
use corral_core::namespace::uts;

use super::IsolationBackend;

/// Backend that performs the real system calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxBackend;

impl IsolationBackend for LinuxBackend {
    fn set_hostname(&self, hostname: &str) -> Result<()> {
        uts::set_hostname(hostname)
    }

    fn change_root(&self, rootfs: &Path) -> Result<()> {
        chroot::change_root(rootfs)
    }

    fn change_dir(&self, dir: &Path) -> Result<()> {
        chroot::change_dir(dir)
    }

    fn create_dir(&self, dir: &Path) -> Result<()> {
        mount::ensure_dir(dir)
    }

    fn mount(&self, spec: &mount::MountSpec) -> Result<()> {
        mount::mount_filesystem(spec)
    }

    fn unmount(&self, target: &Path) -> Result<()> {
        mount::unmount(target)
    }
}
