//! Two-phase container bootstrap for the corral runtime.
//!
//! The [`launcher`] runs in the original process and re-executes the binary
//! into fresh namespaces. The [`bootstrap`] module runs inside that new
//! process: it limits resources, changes hostname and root, mounts the
//! pseudo-filesystems, runs the command, and always cleans up afterwards.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod bootstrap;
pub mod cleanup;
pub mod container;
pub mod exec;
pub mod launcher;
pub mod limiter;
pub mod mode;
pub mod mounts;
pub mod status;
