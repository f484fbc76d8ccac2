//! Process-count cgroup management.
//!
//! A container gets one leaf directory under the `pids` hierarchy holding
//! its process limit, the release-notification flag, and its member list.
//! The node keeps a descriptor of its parent directory so it can still be
//! released and removed after the process has changed its root.

pub mod pids;

use std::ffi::CString;
use std::fs::File;
use std::io::Write;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};

use nix::dir::Dir;
use nix::errno::Errno;
use nix::fcntl::{OFlag, open, openat};
use nix::sys::stat::Mode;
use nix::unistd::{UnlinkatFlags, unlinkat};

use corral_common::constants::{CGROUP_PROCS_FILE, NOTIFY_ON_RELEASE_FILE};
use corral_common::error::{CorralError, Result};

/// Flags for directory descriptors that are only used as `*at` anchors.
const DIR_FLAGS: OFlag = OFlag::O_RDONLY
    .union(OFlag::O_DIRECTORY)
    .union(OFlag::O_CLOEXEC);

/// Handle to the cgroup node of one container.
#[derive(Debug)]
pub struct CgroupNode {
    /// Full path of the node at creation time.
    path: PathBuf,
    /// Leaf directory name.
    name: String,
    /// Open descriptor of the hierarchy root containing the node.
    parent: OwnedFd,
}

impl CgroupNode {
    /// Creates (or reuses) the node `<root>/<name>`.
    ///
    /// The hierarchy root must already exist. An existing node directory is
    /// not an error, so repeated runs with the same name succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if the hierarchy root cannot be opened or the node
    /// directory cannot be created. Nothing is created in the first case.
    pub fn create(root: &Path, name: &str) -> Result<Self> {
        let parent = open(root, DIR_FLAGS, Mode::empty())
            .map_err(|e| CorralError::setup("open", root.display(), e))?;
        let path = root.join(name);
        std::fs::create_dir_all(&path).map_err(|e| CorralError::setup("mkdir", path.display(), e))?;
        tracing::info!(path = %path.display(), "cgroup created");
        Ok(Self {
            path,
            name: name.to_string(),
            parent,
        })
    }

    /// Returns the node's path as seen at creation time.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets the maximum number of processes.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `pids.max` fails.
    pub fn set_max_procs(&self, max_procs: u32) -> Result<()> {
        pids::set_max_procs(&self.path, max_procs)
    }

    /// Enables release notification for the node.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `notify_on_release` fails.
    pub fn enable_release_notification(&self) -> Result<()> {
        write_control(&self.path, NOTIFY_ON_RELEASE_FILE, "1")?;
        tracing::debug!("release notification enabled");
        Ok(())
    }

    /// Adds a process to this cgroup by writing its PID.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `cgroup.procs` fails.
    pub fn add_process(&self, pid: u32) -> Result<()> {
        write_control(&self.path, CGROUP_PROCS_FILE, &pid.to_string())?;
        tracing::debug!(pid, "added process to cgroup");
        Ok(())
    }

    /// Moves the calling process back into the parent group and removes the node.
    ///
    /// Every step works relative to the parent descriptor, so removal is
    /// unaffected by a root change made after [`create`](Self::create). On a
    /// real cgroup filesystem the control files vanish with the directory;
    /// on an ordinary filesystem the entries left in the node are unlinked
    /// first. A node that is already gone counts as removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be removed.
    pub fn destroy(&self) -> Result<()> {
        if let Err(e) = self.release_self() {
            tracing::debug!(error = %e, "could not leave cgroup before removal");
        }
        let removed = match self.remove_node() {
            Err(Errno::ENOTEMPTY | Errno::EEXIST) => {
                self.clear_entries().and_then(|()| self.remove_node())
            }
            other => other,
        };
        match removed {
            Ok(()) | Err(Errno::ENOENT) => {}
            Err(e) => return Err(CorralError::setup("rmdir", self.path.display(), e)),
        }
        tracing::info!(path = %self.path.display(), "cgroup destroyed");
        Ok(())
    }

    /// Writes the caller's PID into the parent's membership file.
    ///
    /// A parent without `cgroup.procs` is not a cgroup and holds nobody.
    fn release_self(&self) -> std::io::Result<()> {
        let flags = OFlag::O_WRONLY | OFlag::O_CLOEXEC;
        let fd = match openat(&self.parent, CGROUP_PROCS_FILE, flags, Mode::empty()) {
            Ok(fd) => fd,
            Err(Errno::ENOENT) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        File::from(fd).write_all(std::process::id().to_string().as_bytes())
    }

    fn remove_node(&self) -> nix::Result<()> {
        unlinkat(&self.parent, self.name.as_str(), UnlinkatFlags::RemoveDir)
    }

    /// Unlinks the entries of the node. Empty subdirectories are removed
    /// too; anything deeper is left for `rmdir` to report.
    fn clear_entries(&self) -> nix::Result<()> {
        let mut node = Dir::openat(&self.parent, self.name.as_str(), DIR_FLAGS, Mode::empty())?;
        let names = node
            .iter()
            .map(|entry| entry.map(|e| e.file_name().to_owned()))
            .collect::<nix::Result<Vec<CString>>>()?;
        for name in names
            .iter()
            .filter(|n| !matches!(n.as_bytes(), b"." | b".."))
        {
            match unlinkat(&node, name.as_c_str(), UnlinkatFlags::NoRemoveDir) {
                Err(Errno::EISDIR | Errno::EPERM) => {
                    unlinkat(&node, name.as_c_str(), UnlinkatFlags::RemoveDir)?;
                }
                other => other?,
            }
        }
        Ok(())
    }
}

/// Writes `value` to the control file `name` inside `cgroup_path`.
fn write_control(cgroup_path: &Path, name: &str, value: &str) -> Result<()> {
    let file = cgroup_path.join(name);
    std::fs::write(&file, value).map_err(|e| CorralError::setup("write", file.display(), e))
}
