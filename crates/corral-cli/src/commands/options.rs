//! Container options shared by `run` and `plan`.
//!
//! Values resolve in increasing precedence: built-in defaults, the JSON
//! file given with `--config`, then flags (or their `CORRAL_*` variables).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use corral_common::config::{ContainerConfig, split_env_entry};
use corral_common::types::unique_cgroup_name;

/// Options describing one container.
#[derive(Args, Debug, Default)]
pub struct ContainerOptions {
    /// JSON configuration file; flags override its values.
    #[arg(long = "config", value_name = "FILE", env = "CORRAL_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Directory that becomes the container's root filesystem.
    #[arg(long, value_name = "DIR", env = "CORRAL_ROOTFS")]
    pub rootfs: Option<PathBuf>,

    /// Hostname inside the container.
    #[arg(long, env = "CORRAL_HOSTNAME")]
    pub hostname: Option<String>,

    /// Name of the cgroup node; a unique one is generated when omitted.
    #[arg(long, env = "CORRAL_CGROUP_NAME")]
    pub cgroup_name: Option<String>,

    /// Root of the `pids` cgroup hierarchy.
    #[arg(long, value_name = "DIR", env = "CORRAL_CGROUP_ROOT")]
    pub cgroup_root: Option<PathBuf>,

    /// Maximum number of processes inside the container.
    #[arg(long, env = "CORRAL_MAX_PROCS")]
    pub max_procs: Option<u32>,

    /// Working directory inside the container (absolute).
    #[arg(long, value_name = "DIR", env = "CORRAL_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Size of the `/tmp` tmpfs in bytes.
    #[arg(long, value_name = "BYTES", env = "CORRAL_TMP_SIZE")]
    pub tmp_size: Option<u64>,

    /// Environment entry for the command; replaces an entry with the same key.
    #[arg(short, long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Program to run followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl ContainerOptions {
    /// Builds the container configuration.
    ///
    /// Does not validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded or an
    /// `--env` entry is not `KEY=VALUE`.
    pub fn resolve(&self) -> anyhow::Result<ContainerConfig> {
        let (mut config, file_names_cgroup) = match &self.config_file {
            Some(path) => load_file(path)?,
            None => (ContainerConfig::default(), false),
        };

        if !self.command.is_empty() {
            config.command.clone_from(&self.command);
        }
        if let Some(rootfs) = &self.rootfs {
            config.rootfs_path.clone_from(rootfs);
        }
        if let Some(hostname) = &self.hostname {
            config.hostname.clone_from(hostname);
        }
        if let Some(root) = &self.cgroup_root {
            config.cgroup_root.clone_from(root);
        }
        if let Some(max) = self.max_procs {
            config.max_procs = max;
        }
        if let Some(dir) = &self.workdir {
            config.working_dir.clone_from(dir);
        }
        if let Some(size) = self.tmp_size {
            config.tmp_size_bytes = size;
        }
        match &self.cgroup_name {
            Some(name) => config.cgroup_name.clone_from(name),
            None if !file_names_cgroup => config.cgroup_name = unique_cgroup_name(),
            None => {}
        }
        for entry in &self.env {
            let (key, _) = split_env_entry(entry)?;
            config
                .environment
                .retain(|existing| !split_env_entry(existing).is_ok_and(|(k, _)| k == key));
            config.environment.push(entry.clone());
        }

        Ok(config)
    }
}

/// Loads a configuration file and reports whether it names the cgroup.
fn load_file(path: &Path) -> anyhow::Result<(ContainerConfig, bool)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    let names_cgroup = document.get("cgroup_name").is_some();
    let config = ContainerConfig::from_json(&content)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok((config, names_cgroup))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn options(command: &[&str]) -> ContainerOptions {
        ContainerOptions {
            rootfs: Some(PathBuf::from("/srv/rootfs")),
            command: command.iter().map(ToString::to_string).collect(),
            ..ContainerOptions::default()
        }
    }

    #[test]
    fn resolve_applies_defaults_and_generates_cgroup_name() {
        let config = options(&["/bin/echo", "hello"]).resolve().unwrap();
        assert_eq!(config.command, vec!["/bin/echo", "hello"]);
        assert_eq!(config.hostname, "container");
        assert_eq!(config.max_procs, 20);
        assert!(config.cgroup_name.starts_with("corral-"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolve_env_flag_replaces_same_key() {
        let mut opts = options(&["/bin/sh"]);
        opts.env = vec!["HOME=/home/app".into(), "LANG=C".into()];
        let config = opts.resolve().unwrap();
        assert_eq!(
            config.environment,
            vec![
                "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin",
                "HOME=/home/app",
                "LANG=C",
            ]
        );
    }

    #[test]
    fn resolve_rejects_malformed_env_flag() {
        let mut opts = options(&["/bin/sh"]);
        opts.env = vec!["NOEQUALS".into()];
        assert!(opts.resolve().is_err());
    }

    #[test]
    fn resolve_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"command": ["/bin/true"], "rootfs_path": "/from/file", "cgroup_name": "filebox", "max_procs": 5}}"#
        )
        .unwrap();

        let opts = ContainerOptions {
            config_file: Some(file.path().to_path_buf()),
            max_procs: Some(8),
            ..ContainerOptions::default()
        };
        let config = opts.resolve().unwrap();
        assert_eq!(config.command, vec!["/bin/true"]);
        assert_eq!(config.rootfs_path, PathBuf::from("/from/file"));
        assert_eq!(config.cgroup_name, "filebox");
        assert_eq!(config.max_procs, 8);
    }

    #[test]
    fn resolve_reports_missing_config_file() {
        let opts = ContainerOptions {
            config_file: Some(PathBuf::from("/nonexistent/corral.json")),
            ..ContainerOptions::default()
        };
        let err = opts.resolve().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/corral.json"));
    }
}
