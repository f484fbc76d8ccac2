//! Isolation Bootstrapper: the body of the re-executed process.
//!
//! Runs inside the namespaces created by the launcher and hardens the
//! environment in a fixed order before handing off to the command:
//!
//! ```text
//! Unconfigured -> Limited -> Hostnamed -> Rooted -> ProcMounted
//!              -> AuxMounted -> Executing -> Exited -> CleanedUp
//! ```
//!
//! Each step narrows what the process can see, and later steps rely on
//! earlier ones (`/proc` must land inside the new root). A fatal failure
//! stops the sequence; cleanup runs on every path.

use corral_common::config::ContainerConfig;
use corral_common::constants::{
    BOOTSTRAP_FAILURE_EXIT_CODE, COMMAND_START_EXIT_CODE, CONFIG_ENV,
};
use corral_common::error::{CorralError, ErrorKind, Result};
use corral_common::types::Warning;

use crate::backend::IsolationBackend;
use crate::backend::linux::LinuxBackend;
use crate::cleanup::CleanupGuard;
use crate::status::StatusReporter;
use crate::{exec, limiter, mounts};

/// Progress of one bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Nothing has been done yet.
    Unconfigured,
    /// The process is enrolled in its cgroup with the limit written.
    Limited,
    /// The UTS hostname is set.
    Hostnamed,
    /// The root filesystem has been changed.
    Rooted,
    /// `/proc` is mounted inside the new root.
    ProcMounted,
    /// Auxiliary mounts were attempted.
    AuxMounted,
    /// The command is running.
    Executing,
    /// The command has exited.
    Exited,
    /// Mounts and cgroup have been released.
    CleanedUp,
}

impl Stage {
    /// Returns the stage that follows this one.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Unconfigured => Some(Self::Limited),
            Self::Limited => Some(Self::Hostnamed),
            Self::Hostnamed => Some(Self::Rooted),
            Self::Rooted => Some(Self::ProcMounted),
            Self::ProcMounted => Some(Self::AuxMounted),
            Self::AuxMounted => Some(Self::Executing),
            Self::Executing => Some(Self::Exited),
            Self::Exited => Some(Self::CleanedUp),
            Self::CleanedUp => None,
        }
    }
}

/// Outcome of one bootstrap, after cleanup.
#[derive(Debug)]
pub struct BootstrapReport {
    /// The fatal error or command failure, if any. Warnings never land here.
    pub result: Result<()>,
    /// Last stage reached before cleanup.
    pub reached: Stage,
    /// Every non-fatal failure, setup and cleanup alike.
    pub warnings: Vec<Warning>,
}

impl BootstrapReport {
    /// Exit status of the bootstrap process.
    ///
    /// The command's own status is passed through; start failures map to
    /// 127 and configuration or setup failures to 125. Only the status
    /// channel tells a setup failure from a command that exits 125.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(()) => 0,
            Err(CorralError::CommandFailed { code }) => *code,
            Err(CorralError::CommandStart { .. }) => COMMAND_START_EXIT_CODE,
            Err(_) => BOOTSTRAP_FAILURE_EXIT_CODE,
        }
    }

    /// Description of the configuration or setup failure, if any.
    ///
    /// `None` when the run ended with the command's own outcome.
    #[must_use]
    pub fn setup_failure(&self) -> Option<String> {
        self.result
            .as_ref()
            .err()
            .filter(|e| e.kind() != ErrorKind::Run)
            .map(ToString::to_string)
    }
}

/// Drives the bootstrap sequence for one container.
#[derive(Debug)]
pub struct Bootstrapper<B: IsolationBackend> {
    config: ContainerConfig,
    backend: B,
}

impl<B: IsolationBackend> Bootstrapper<B> {
    /// Creates a bootstrapper over `backend`.
    pub const fn new(config: ContainerConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// Returns the backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs every step, then cleans up exactly once.
    pub fn run(&self) -> BootstrapReport {
        let mut guard = CleanupGuard::new(&self.backend);
        let result = self.advance(&mut guard);
        let reached = guard.stage();
        let warnings = guard.finish();
        BootstrapReport {
            result,
            reached,
            warnings,
        }
    }

    fn advance(&self, guard: &mut CleanupGuard<'_, B>) -> Result<()> {
        let config = &self.config;
        config.validate()?;

        let node = limiter::prepare(&config.cgroup_root, &config.cgroup_name)?;
        let enforced = limiter::enforce(&node, config.max_procs, std::process::id());
        guard.track_cgroup(node);
        enforced?;
        guard.advance(Stage::Limited);

        self.backend.set_hostname(&config.hostname)?;
        guard.advance(Stage::Hostnamed);

        self.backend.change_root(&config.rootfs_path)?;
        guard.advance(Stage::Rooted);
        self.backend.change_dir(&config.working_dir)?;

        mounts::mount_proc(&self.backend)?;
        guard.advance(Stage::ProcMounted);

        let failed = mounts::setup_auxiliary(&self.backend, config.tmp_size_bytes);
        guard.record(failed);
        guard.advance(Stage::AuxMounted);

        guard.advance(Stage::Executing);
        let outcome = exec::run_command(config);
        guard.advance(Stage::Exited);
        outcome
    }
}

/// Reads the configuration handed over by the launcher.
///
/// The command from the argument vector replaces whatever the serialized
/// configuration holds.
///
/// # Errors
///
/// Returns an error if the variable is missing or does not parse.
pub fn config_from_env(command: Vec<String>) -> Result<ContainerConfig> {
    let json = std::env::var(CONFIG_ENV)
        .map_err(|_| CorralError::config(format!("{CONFIG_ENV} is not set")))?;
    let mut config = ContainerConfig::from_json(&json)?;
    config.command = command;
    Ok(config)
}

/// Entry point of the re-executed process. Returns its exit status.
///
/// Configuration and setup failures are also sent on the status channel.
pub fn run_from_env(command: Vec<String>) -> i32 {
    let mut reporter = StatusReporter::from_env();
    let config = match config_from_env(command) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "cannot read container configuration");
            reporter.report(&e.to_string());
            return BOOTSTRAP_FAILURE_EXIT_CODE;
        }
    };
    tracing::info!(
        pid = std::process::id(),
        command = ?config.command,
        "inside container namespaces"
    );

    let report = Bootstrapper::new(config, LinuxBackend).run();
    match &report.result {
        Ok(()) => tracing::info!("container command finished"),
        Err(e) if e.kind() == ErrorKind::Run => tracing::info!(error = %e, "container command failed"),
        Err(e) => tracing::error!(stage = ?report.reached, error = %e, "container bootstrap failed"),
    }
    if let Some(reason) = report.setup_failure() {
        reporter.report(&reason);
    }
    report.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_form_a_single_chain() {
        let mut stage = Stage::Unconfigured;
        let mut count = 1;
        while let Some(next) = stage.successor() {
            assert!(next > stage);
            stage = next;
            count += 1;
        }
        assert_eq!(stage, Stage::CleanedUp);
        assert_eq!(count, 9);
    }

    #[test]
    fn exit_code_passes_command_status_through() {
        let report = BootstrapReport {
            result: Err(CorralError::CommandFailed { code: 42 }),
            reached: Stage::Exited,
            warnings: Vec::new(),
        };
        assert_eq!(report.exit_code(), 42);
        assert!(report.setup_failure().is_none());
    }

    #[test]
    fn exit_code_marks_setup_failures() {
        let report = BootstrapReport {
            result: Err(CorralError::setup(
                "chroot",
                "/missing",
                std::io::Error::from_raw_os_error(libc::ENOENT),
            )),
            reached: Stage::Hostnamed,
            warnings: Vec::new(),
        };
        assert_eq!(report.exit_code(), BOOTSTRAP_FAILURE_EXIT_CODE);
        assert!(report.setup_failure().unwrap().starts_with("chroot /missing"));
    }

    #[test]
    fn exit_code_for_unstartable_program() {
        let report = BootstrapReport {
            result: Err(CorralError::CommandStart {
                program: "/bin/nope".into(),
                source: std::io::Error::from_raw_os_error(libc::ENOENT),
            }),
            reached: Stage::Exited,
            warnings: Vec::new(),
        };
        assert_eq!(report.exit_code(), COMMAND_START_EXIT_CODE);
    }
}
