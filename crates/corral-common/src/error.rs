//! Unified error types for the corral workspace.
//!
//! Errors fall into three kinds: configuration problems detected before any
//! isolation call, setup failures of the isolation machinery itself, and run
//! failures where the workload exited unsuccessfully. Best-effort failures are
//! not errors at all; they travel as [`Warning`](crate::types::Warning) values.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CorralError {
    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An isolation step failed at the OS level.
    #[error("{operation} {target}: {source}")]
    Setup {
        /// Name of the failed operation (e.g. `"mount"`, `"chroot"`).
        operation: &'static str,
        /// Path, file, or value the operation was applied to.
        target: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// An I/O operation outside the isolation sequence failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The target program could not be started.
    #[error("failed to start {program}: {source}")]
    CommandStart {
        /// Program that was executed.
        program: String,
        /// Underlying spawn error.
        source: std::io::Error,
    },

    /// The workload exited with a non-zero status.
    #[error("command exited with status {code}")]
    CommandFailed {
        /// Exit status of the command (`128 + N` for death by signal `N`).
        code: i32,
    },

    /// The isolated process reported that bootstrapping failed.
    #[error("container bootstrap failed (exit status {code}): {reason}")]
    BootstrapFailed {
        /// Exit status of the bootstrap process.
        code: i32,
        /// Failure description sent by the bootstrapper.
        reason: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Coarse classification of a [`CorralError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any isolation call was made.
    Config,
    /// The container infrastructure failed.
    Setup,
    /// The workload itself failed.
    Run,
}

impl CorralError {
    /// Builds a [`CorralError::Setup`] from an operation, a target, and an error.
    pub fn setup(
        operation: &'static str,
        target: impl std::fmt::Display,
        source: impl Into<std::io::Error>,
    ) -> Self {
        Self::Setup {
            operation,
            target: target.to_string(),
            source: source.into(),
        }
    }

    /// Builds a [`CorralError::Config`] from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } | Self::Io { .. } | Self::Serialization { .. } => ErrorKind::Config,
            Self::Setup { .. } | Self::BootstrapFailed { .. } => ErrorKind::Setup,
            Self::CommandStart { .. } | Self::CommandFailed { .. } => ErrorKind::Run,
        }
    }

    /// Exit status of the workload, if this error carries one.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { code } => Some(*code),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CorralError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_error_names_operation_and_target() {
        let err = CorralError::setup(
            "chroot",
            "/missing/rootfs",
            std::io::Error::from_raw_os_error(2),
        );
        let text = err.to_string();
        assert!(text.starts_with("chroot /missing/rootfs: "));
        assert_eq!(err.kind(), ErrorKind::Setup);
    }

    #[test]
    fn command_failed_is_a_run_error_with_code() {
        let err = CorralError::CommandFailed { code: 3 };
        assert_eq!(err.kind(), ErrorKind::Run);
        assert_eq!(err.exit_code(), Some(3));
    }

    #[test]
    fn bootstrap_failure_is_distinct_from_run_failure() {
        let err = CorralError::BootstrapFailed {
            code: 125,
            reason: "chroot /missing: No such file or directory".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Setup);
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn config_error_kind() {
        assert_eq!(CorralError::config("empty command").kind(), ErrorKind::Config);
    }
}
