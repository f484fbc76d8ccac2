//! Container configuration model.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{CorralError, Result};

/// Everything needed to run one command in an isolated environment.
///
/// Immutable once built. The Launcher serializes it into the re-executed
/// process, which rebuilds its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Program path followed by its arguments. Must not be empty.
    pub command: Vec<String>,
    /// Hostname inside the UTS namespace.
    pub hostname: String,
    /// Directory that becomes `/` for the isolated process.
    pub rootfs_path: PathBuf,
    /// Leaf directory name under the `pids` cgroup hierarchy.
    pub cgroup_name: String,
    /// Root of the `pids` cgroup hierarchy.
    pub cgroup_root: PathBuf,
    /// Upper bound on concurrently running processes.
    pub max_procs: u32,
    /// Starting directory, relative to the new root.
    pub working_dir: PathBuf,
    /// `KEY=VALUE` entries handed verbatim to the command.
    ///
    /// Not deduplicated; callers must remove duplicates themselves.
    pub environment: Vec<String>,
    /// Capacity of the `/tmp` tmpfs in bytes.
    pub tmp_size_bytes: u64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            hostname: constants::DEFAULT_HOSTNAME.into(),
            rootfs_path: PathBuf::new(),
            cgroup_name: constants::DEFAULT_CGROUP_NAME.into(),
            cgroup_root: PathBuf::from(constants::DEFAULT_CGROUP_ROOT),
            max_procs: constants::DEFAULT_MAX_PROCS,
            working_dir: PathBuf::from("/"),
            environment: vec![constants::DEFAULT_PATH.into(), constants::DEFAULT_HOME.into()],
            tmp_size_bytes: constants::DEFAULT_TMP_SIZE_BYTES,
        }
    }
}

impl ContainerConfig {
    /// Creates a configuration for `command` with default settings.
    #[must_use]
    pub fn new(command: Vec<String>, rootfs_path: impl Into<PathBuf>) -> Self {
        Self {
            command,
            rootfs_path: rootfs_path.into(),
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CorralError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Serializes the configuration for the re-executed process.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a configuration produced by [`to_json`](Self::to_json).
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks every configuration invariant.
    ///
    /// Performs no isolation syscalls. Whether `rootfs_path` exists is left
    /// to the root change itself, which reports it as a setup error.
    ///
    /// # Errors
    ///
    /// Returns [`CorralError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.command.is_empty() {
            return Err(CorralError::config("command is empty"));
        }
        if self.command[0].is_empty() {
            return Err(CorralError::config("program path is empty"));
        }
        if self.rootfs_path.as_os_str().is_empty() {
            return Err(CorralError::config("rootfs path is empty"));
        }
        if !self.working_dir.is_absolute() {
            return Err(CorralError::config(format!(
                "working directory must be absolute: {}",
                self.working_dir.display()
            )));
        }
        if self.max_procs == 0 {
            return Err(CorralError::config("max_procs must be positive"));
        }
        validate_cgroup_name(&self.cgroup_name)?;
        validate_hostname(&self.hostname)?;
        for entry in &self.environment {
            let _ = split_env_entry(entry)?;
        }
        Ok(())
    }

    /// Splits the environment into `(key, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is not of the form `KEY=VALUE`.
    pub fn env_pairs(&self) -> Result<Vec<(&str, &str)>> {
        self.environment
            .iter()
            .map(|entry| split_env_entry(entry))
            .collect()
    }
}

/// Splits one `KEY=VALUE` entry at the first `=`.
///
/// # Errors
///
/// Returns an error if the entry has no `=` or an empty key.
pub fn split_env_entry(entry: &str) -> Result<(&str, &str)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.is_empty() && !key.contains('\0') && !value.contains('\0') => {
            Ok((key, value))
        }
        _ => Err(CorralError::config(format!(
            "environment entry is not KEY=VALUE: {entry:?}"
        ))),
    }
}

fn validate_cgroup_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if name.is_empty() || name.contains('/') || name.contains('\0') || !single_normal {
        return Err(CorralError::config(format!(
            "cgroup name must be a single path segment: {name:?}"
        )));
    }
    Ok(())
}

fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.is_empty()
        || hostname.len() > constants::MAX_HOSTNAME_LEN
        || hostname.contains('\0')
    {
        return Err(CorralError::config(format!("invalid hostname: {hostname:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_config() -> ContainerConfig {
        ContainerConfig::new(vec!["/bin/echo".into(), "hello".into()], "/srv/rootfs")
    }

    #[test]
    fn default_matches_reference_defaults() {
        let cfg = ContainerConfig::default();
        assert_eq!(cfg.hostname, "container");
        assert_eq!(cfg.max_procs, 20);
        assert_eq!(cfg.working_dir, PathBuf::from("/"));
        assert_eq!(cfg.cgroup_root, PathBuf::from("/sys/fs/cgroup/pids"));
        assert_eq!(cfg.environment.len(), 2);
        assert!(cfg.environment[0].starts_with("PATH="));
    }

    #[test]
    fn valid_config_passes() {
        echo_config().validate().expect("config should be valid");
    }

    #[test]
    fn empty_command_is_rejected() {
        let mut cfg = echo_config();
        cfg.command.clear();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, CorralError::Config { .. }));
    }

    #[test]
    fn cgroup_name_must_be_one_segment() {
        for bad in ["", ".", "..", "a/b", "/abs"] {
            let mut cfg = echo_config();
            cfg.cgroup_name = bad.into();
            assert!(cfg.validate().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn relative_working_dir_is_rejected() {
        let mut cfg = echo_config();
        cfg.working_dir = PathBuf::from("srv");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_max_procs_is_rejected() {
        let mut cfg = echo_config();
        cfg.max_procs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_entries_split_at_first_equals() {
        let mut cfg = echo_config();
        cfg.environment = vec!["A=1".into(), "B=x=y".into(), "C=".into()];
        let pairs = cfg.env_pairs().unwrap();
        assert_eq!(pairs, vec![("A", "1"), ("B", "x=y"), ("C", "")]);
    }

    #[test]
    fn env_entry_without_equals_is_rejected() {
        let mut cfg = echo_config();
        cfg.environment = vec!["NOVALUE".into()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_roundtrip_preserves_config() {
        let cfg = echo_config();
        let back = ContainerConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn from_file_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corral.json");
        std::fs::write(&path, r#"{"rootfs_path": "/srv/alpine", "max_procs": 5}"#).unwrap();
        let cfg = ContainerConfig::from_file(&path).unwrap();
        assert_eq!(cfg.rootfs_path, PathBuf::from("/srv/alpine"));
        assert_eq!(cfg.max_procs, 5);
        assert_eq!(cfg.hostname, "container");
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = ContainerConfig::from_file(Path::new("/nonexistent/corral.json")).unwrap_err();
        assert!(matches!(err, CorralError::Io { .. }));
    }
}
