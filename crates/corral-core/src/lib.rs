//! # corral-core
//!
//! Low-level Linux isolation primitives for the corral runtime.
//!
//! This crate provides safe abstractions over:
//! - **Namespaces**: spawning into fresh UTS, PID, mount, network, and IPC
//!   namespaces, private mount propagation, and the UTS hostname.
//! - **Filesystem**: `chroot(2)`, working-directory changes, and
//!   `mount(2)`/`umount2(2)` for pseudo-filesystems.
//! - **Cgroups**: the process-count (`pids`) controller node of a container.
//!
//! All unsafe system calls are encapsulated in safe wrappers with
//! proper error handling and `// SAFETY:` documentation.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod cgroup;
pub mod filesystem;
pub mod namespace;
