//! Mount Manager: pseudo-filesystems inside the new root.
//!
//! `/proc` is required and its failure is fatal. `/tmp` and `/dev/pts` are
//! conveniences: their failures become [`Warning`]s and startup continues.

use std::path::Path;

use corral_common::error::Result;
use corral_common::types::Warning;
use corral_core::filesystem::mount::MountSpec;

use crate::backend::IsolationBackend;

/// Process-information filesystem mount point.
pub const PROC_TARGET: &str = "/proc";
/// Temporary storage mount point.
pub const TMP_TARGET: &str = "/tmp";
/// Pseudo-terminal devices mount point.
pub const DEV_PTS_TARGET: &str = "/dev/pts";

/// Mount points removed during teardown, in order.
pub const TEARDOWN_ORDER: [&str; 3] = [PROC_TARGET, TMP_TARGET, DEV_PTS_TARGET];

/// Mounts `proc` at `/proc`.
///
/// # Errors
///
/// Returns an error if the mount fails.
pub fn mount_proc(backend: &impl IsolationBackend) -> Result<()> {
    backend.mount(&MountSpec::pseudo("proc", PROC_TARGET))?;
    tracing::info!("mounted /proc");
    Ok(())
}

/// Builds the size-bounded `/tmp` tmpfs mount.
#[must_use]
pub fn tmp_mount(size_bytes: u64) -> MountSpec {
    MountSpec::pseudo("tmpfs", TMP_TARGET).with_data(format!("size={size_bytes}"))
}

/// Mounts `/tmp` and `/dev/pts`, collecting failures as warnings.
pub fn setup_auxiliary(backend: &impl IsolationBackend, tmp_size_bytes: u64) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if let Err(e) = backend.mount(&tmp_mount(tmp_size_bytes)) {
        warnings.push(Warning::warning("mount", TMP_TARGET, e));
    }

    let dev_pts = Path::new(DEV_PTS_TARGET);
    match backend.create_dir(dev_pts) {
        Ok(()) => {
            if let Err(e) = backend.mount(&MountSpec::pseudo("devpts", DEV_PTS_TARGET)) {
                warnings.push(Warning::warning("mount", DEV_PTS_TARGET, e));
            }
        }
        Err(e) => warnings.push(Warning::warning("mkdir", DEV_PTS_TARGET, e)),
    }

    tracing::debug!(failed = warnings.len(), "auxiliary mounts done");
    warnings
}

/// Unmounts `/proc`, `/tmp`, and `/dev/pts`, each attempted independently.
///
/// A lingering `/proc` can pin namespace resources after the container's
/// processes are gone, so its failure is a [`Severity::Warning`]; the others
/// are best-effort.
///
/// [`Severity::Warning`]: corral_common::types::Severity::Warning
pub fn teardown(backend: &impl IsolationBackend) -> Vec<Warning> {
    TEARDOWN_ORDER
        .iter()
        .filter_map(|target| {
            backend.unmount(Path::new(target)).err().map(|e| {
                if *target == PROC_TARGET {
                    Warning::warning("umount", target, e)
                } else {
                    Warning::best_effort("umount", target, e)
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use corral_common::error::CorralError;
    use corral_common::types::Severity;

    use super::*;

    /// Backend whose mounts fail for the listed targets.
    #[derive(Default)]
    struct FlakyBackend {
        failing: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FlakyBackend {
        fn failing(targets: &[&'static str]) -> Self {
            Self {
                failing: targets.to_vec(),
                ..Self::default()
            }
        }

        fn outcome(&self, op: &str, target: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("{op} {}", target.display()));
            if self.failing.iter().any(|t| Path::new(t) == target) {
                return Err(CorralError::setup(
                    "mount",
                    target.display(),
                    std::io::Error::from_raw_os_error(libc::ENOENT),
                ));
            }
            Ok(())
        }
    }

    impl IsolationBackend for FlakyBackend {
        fn set_hostname(&self, _hostname: &str) -> Result<()> {
            Ok(())
        }
        fn change_root(&self, _rootfs: &Path) -> Result<()> {
            Ok(())
        }
        fn change_dir(&self, _dir: &Path) -> Result<()> {
            Ok(())
        }
        fn create_dir(&self, dir: &Path) -> Result<()> {
            self.outcome("mkdir", dir)
        }
        fn mount(&self, spec: &MountSpec) -> Result<()> {
            self.outcome("mount", &spec.target)
        }
        fn unmount(&self, target: &Path) -> Result<()> {
            self.outcome("umount", target)
        }
    }

    #[test]
    fn tmp_mount_expresses_size_in_bytes() {
        let spec = tmp_mount(100 * 1024 * 1024);
        assert_eq!(spec.fstype, "tmpfs");
        assert_eq!(spec.target, PathBuf::from("/tmp"));
        assert_eq!(spec.data.as_deref(), Some("size=104857600"));
    }

    #[test]
    fn auxiliary_failures_are_warnings_not_errors() {
        let backend = FlakyBackend::failing(&["/tmp"]);
        let warnings = setup_auxiliary(&backend, 1024);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].target, "/tmp");
        assert_eq!(warnings[0].severity, Severity::Warning);
        assert!(backend.calls.borrow().contains(&"mount /dev/pts".to_string()));
    }

    #[test]
    fn dev_pts_is_not_mounted_when_directory_cannot_be_created() {
        let backend = FlakyBackend::failing(&["/dev/pts"]);
        let warnings = setup_auxiliary(&backend, 1024);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].operation, "mkdir");
        assert!(!backend.calls.borrow().contains(&"mount /dev/pts".to_string()));
    }

    #[test]
    fn teardown_attempts_every_target_in_order() {
        let backend = FlakyBackend::failing(&["/proc", "/tmp", "/dev/pts"]);
        let warnings = teardown(&backend);
        assert_eq!(
            *backend.calls.borrow(),
            vec!["umount /proc", "umount /tmp", "umount /dev/pts"]
        );
        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[0].severity, Severity::Warning);
        assert_eq!(warnings[1].severity, Severity::BestEffort);
        assert_eq!(warnings[2].severity, Severity::BestEffort);
    }

    #[test]
    fn clean_teardown_reports_nothing() {
        let backend = FlakyBackend::default();
        assert!(teardown(&backend).is_empty());
    }
}
