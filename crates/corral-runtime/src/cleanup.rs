//! Cleanup: scoped release of everything the bootstrapper set up.
//!
//! A [`CleanupGuard`] is created when bootstrapping starts and releases on
//! every exit path: explicitly through [`CleanupGuard::finish`], or from
//! `Drop` if the bootstrapper unwinds. Release happens at most once.

use corral_common::types::{Severity, Warning};
use corral_core::cgroup::CgroupNode;

use crate::backend::IsolationBackend;
use crate::bootstrap::Stage;
use crate::mounts;

/// Tracks bootstrap progress and the resources that must be released.
#[derive(Debug)]
pub struct CleanupGuard<'a, B: IsolationBackend> {
    backend: &'a B,
    stage: Stage,
    cgroup: Option<CgroupNode>,
    warnings: Vec<Warning>,
    released: bool,
}

impl<'a, B: IsolationBackend> CleanupGuard<'a, B> {
    /// Arms a guard for a bootstrap that has not done anything yet.
    pub const fn new(backend: &'a B) -> Self {
        Self {
            backend,
            stage: Stage::Unconfigured,
            cgroup: None,
            warnings: Vec::new(),
            released: false,
        }
    }

    /// Returns the last stage reached.
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Records that the bootstrap has reached `next`.
    ///
    /// Stages must be entered in order, one at a time.
    pub fn advance(&mut self, next: Stage) {
        debug_assert_eq!(
            self.stage.successor(),
            Some(next),
            "bootstrap stage skipped or repeated"
        );
        tracing::debug!(from = ?self.stage, to = ?next, "bootstrap stage");
        self.stage = next;
    }

    /// Takes ownership of the cgroup node so it is removed on release.
    pub fn track_cgroup(&mut self, node: CgroupNode) {
        self.cgroup = Some(node);
    }

    /// Logs and keeps non-fatal failures.
    pub fn record(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            log_warning(&warning);
            self.warnings.push(warning);
        }
    }

    /// Releases everything now and returns all warnings of the run.
    pub fn finish(mut self) -> Vec<Warning> {
        self.release();
        std::mem::take(&mut self.warnings)
    }

    /// Unmounts (only once `/proc` is in place, as nothing was mounted
    /// before) and then removes the cgroup node. Never fails.
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if self.stage >= Stage::ProcMounted {
            let failed = mounts::teardown(self.backend);
            self.record(failed);
        }
        if let Some(node) = self.cgroup.take() {
            if let Err(e) = node.destroy() {
                self.record([Warning::warning("rmdir", node.path().display(), e)]);
            }
        }

        tracing::info!(
            reached = ?self.stage,
            warnings = self.warnings.len(),
            "container cleaned up"
        );
        self.stage = Stage::CleanedUp;
    }
}

impl<B: IsolationBackend> Drop for CleanupGuard<'_, B> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Emits a warning at the level its severity calls for.
pub fn log_warning(warning: &Warning) {
    match warning.severity {
        Severity::Warning => tracing::warn!(
            operation = %warning.operation,
            target = %warning.target,
            error = %warning.message,
            "non-fatal failure"
        ),
        Severity::BestEffort => tracing::debug!(
            operation = %warning.operation,
            target = %warning.target,
            error = %warning.message,
            "best-effort step failed"
        ),
    }
}
