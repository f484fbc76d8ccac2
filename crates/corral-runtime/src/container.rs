//! Launcher-side container handle.

use corral_common::config::ContainerConfig;
use corral_common::error::Result;
use corral_core::namespace::NamespaceConfig;

use crate::{launcher, status};

/// One run of a command in an isolated environment.
///
/// Exists only for the duration of the run. The bootstrapper rebuilds its
/// own configuration from the re-execution arguments; it never shares this
/// object.
#[derive(Debug)]
pub struct Container {
    config: ContainerConfig,
    namespaces: NamespaceConfig,
    /// PID of the bootstrap process (if started).
    pid: Option<u32>,
    /// ISO-8601 creation timestamp.
    created_at: String,
}

impl Container {
    /// Creates a handle that isolates in all five namespaces.
    #[must_use]
    pub fn new(config: ContainerConfig) -> Self {
        Self {
            config,
            namespaces: NamespaceConfig::default(),
            pid: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Returns the PID of the bootstrap process once it has been started.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Runs the container to completion.
    ///
    /// Validates the configuration, re-executes the binary into new
    /// namespaces, and waits for it. Cleanup happens inside the isolated
    /// process before it exits, so it is complete when this returns.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before anything is started, a setup
    /// error if the isolated process could not be created or reported a
    /// bootstrap failure, or [`CommandFailed`] carrying the command's exit
    /// status.
    ///
    /// [`CommandFailed`]: corral_common::error::CorralError::CommandFailed
    pub fn run(&mut self) -> Result<()> {
        self.config.validate()?;
        tracing::info!(
            command = ?self.config.command,
            launcher_pid = std::process::id(),
            "starting container"
        );

        let spawned = launcher::spawn(&self.config, &self.namespaces)?;
        let pid = spawned.pid;
        self.pid = Some(pid);
        tracing::info!(pid, created_at = %self.created_at, "container started");

        // EOF arrives when the bootstrap process exits; reap it either way.
        let failure = status::read_failure(spawned.status);
        let code = launcher::wait(pid)?;
        tracing::info!(pid, code, "container exited");
        launcher::interpret_exit(code, failure?)
    }
}

#[cfg(test)]
mod tests {
    use corral_common::error::CorralError;

    use super::*;

    #[test]
    fn new_container_has_no_pid() {
        let c = Container::new(ContainerConfig::new(vec!["sh".into()], "/srv/rootfs"));
        assert!(c.pid().is_none());
        assert_eq!(c.config().command, vec!["sh"]);
        assert!(!c.created_at().is_empty());
    }

    #[test]
    fn empty_command_fails_before_spawning() {
        let mut c = Container::new(ContainerConfig::new(Vec::new(), "/srv/rootfs"));
        let err = c.run().unwrap_err();
        assert!(matches!(err, CorralError::Config { .. }));
        assert!(c.pid().is_none());
    }
}
