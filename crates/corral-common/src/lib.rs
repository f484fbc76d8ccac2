//! # corral-common
//!
//! Shared configuration model, error taxonomy, structured warnings, and
//! constants used across the corral workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and performs no isolation syscalls itself.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
