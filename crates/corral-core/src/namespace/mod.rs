//! Linux namespace management for container isolation.
//!
//! Namespace flags only take effect at process creation, so the container
//! process is created with `clone(2)` rather than unsharing an already
//! running process.

pub mod mount;
pub mod uts;

#[cfg(target_os = "linux")]
use corral_common::error::Result;

/// Which namespaces a new container process receives.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Isolate PID namespace.
    pub pid: bool,
    /// Isolate mount namespace.
    pub mount: bool,
    /// Isolate network namespace.
    pub network: bool,
    /// Isolate IPC namespace.
    pub ipc: bool,
    /// Isolate UTS (hostname) namespace.
    pub uts: bool,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            pid: true,
            mount: true,
            network: true,
            ipc: true,
            uts: true,
        }
    }
}

#[cfg(target_os = "linux")]
impl NamespaceConfig {
    /// Returns the `clone(2)` flags for the enabled namespaces.
    #[must_use]
    pub fn clone_flags(&self) -> nix::sched::CloneFlags {
        use nix::sched::CloneFlags;

        let mut flags = CloneFlags::empty();
        flags.set(CloneFlags::CLONE_NEWUTS, self.uts);
        flags.set(CloneFlags::CLONE_NEWPID, self.pid);
        flags.set(CloneFlags::CLONE_NEWNS, self.mount);
        flags.set(CloneFlags::CLONE_NEWNET, self.network);
        flags.set(CloneFlags::CLONE_NEWIPC, self.ipc);
        flags
    }
}

/// Stack size handed to the cloned child before it execs.
#[cfg(target_os = "linux")]
const CLONE_STACK_SIZE: usize = 1024 * 1024;

/// Creates a child process inside fresh namespaces and runs `child` in it.
///
/// The return value of `child` becomes the exit status of the new process;
/// `child` is expected to `exec` and never return on success. The caller
/// reaps the returned PID with `waitpid(2)` (`SIGCHLD` is delivered on exit).
///
/// # Errors
///
/// Returns an error if `clone(2)` fails, typically because the caller lacks
/// `CAP_SYS_ADMIN` or the kernel lacks a namespace type.
#[cfg(target_os = "linux")]
pub fn spawn_in_namespaces<'a>(
    config: &NamespaceConfig,
    child: impl FnMut() -> isize + 'a,
) -> Result<nix::unistd::Pid> {
    use corral_common::error::CorralError;

    let flags = config.clone_flags();
    let mut stack = vec![0u8; CLONE_STACK_SIZE];
    // SAFETY: without CLONE_VM the child runs on a copy-on-write image of
    // this process, so `stack` and everything `child` borrows stay valid in
    // it. The child only prepares and performs an exec. The caller is
    // single-threaded at this point, so no lock can be held by a thread that
    // does not exist in the child.
    let pid = unsafe {
        nix::sched::clone(
            Box::new(child),
            &mut stack,
            flags,
            Some(libc::SIGCHLD),
        )
    }
    .map_err(|e| CorralError::setup("clone", format!("{flags:?}"), e))?;
    tracing::debug!(pid = pid.as_raw(), ?flags, "process cloned into new namespaces");
    Ok(pid)
}
