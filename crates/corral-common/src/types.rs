//! Domain primitive types used across the corral workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How loudly a best-effort failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Worth an operator's attention (logged at `warn`).
    Warning,
    /// Expected on minimal root filesystems (logged at `debug`).
    BestEffort,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// A recorded non-fatal failure.
///
/// Warnings never abort a run and never change its exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Operation that failed (e.g. `"umount"`).
    pub operation: String,
    /// Path the operation was applied to.
    pub target: String,
    /// Rendered underlying error.
    pub message: String,
    /// Reporting level.
    pub severity: Severity,
}

impl Warning {
    /// Records a failure at [`Severity::Warning`].
    pub fn warning(
        operation: impl Into<String>,
        target: impl fmt::Display,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            operation: operation.into(),
            target: target.to_string(),
            message: error.to_string(),
            severity: Severity::Warning,
        }
    }

    /// Records a failure at [`Severity::BestEffort`].
    pub fn best_effort(
        operation: impl Into<String>,
        target: impl fmt::Display,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            severity: Severity::BestEffort,
            ..Self::warning(operation, target, error)
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.severity, self.operation, self.target, self.message
        )
    }
}

/// Generates a cgroup name that is unique to this run.
#[must_use]
pub fn unique_cgroup_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", crate::constants::APP_NAME, &id[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_effort_warning_keeps_context() {
        let w = Warning::best_effort("umount", "/tmp", "EINVAL");
        assert_eq!(w.severity, Severity::BestEffort);
        assert_eq!(w.to_string(), "best-effort: umount /tmp: EINVAL");
    }

    #[test]
    fn unique_cgroup_names_differ() {
        let a = unique_cgroup_name();
        let b = unique_cgroup_name();
        assert_ne!(a, b);
        assert!(a.starts_with("corral-"));
        assert!(!a.contains('/'));
    }
}
