//! Filesystem management for container isolation.
//!
//! Provides the root change (`chroot(2)` plus the working directory) and
//! mount utilities for the pseudo-filesystems a container needs.

pub mod chroot;
pub mod mount;
