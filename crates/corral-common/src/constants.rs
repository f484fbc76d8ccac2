//! Process-wide constants shared by the Launcher and the bootstrapper.

/// First argument that switches the binary into bootstrap mode.
///
/// The Launcher re-executes itself as `<exe> __corral-init <command...>`.
pub const INIT_MARKER: &str = "__corral-init";

/// Environment variable carrying the serialized [`ContainerConfig`](crate::config::ContainerConfig)
/// into the re-executed process.
pub const CONFIG_ENV: &str = "CORRAL_CONFIG";

/// Environment variable naming the descriptor on which the bootstrapper
/// reports setup failures to the Launcher.
pub const STATUS_FD_ENV: &str = "CORRAL_STATUS_FD";

/// Environment variable selecting the log output format (`json` or text).
pub const LOG_FORMAT_ENV: &str = "CORRAL_LOG_FORMAT";

/// Path used to re-execute the running binary.
pub const SELF_EXE: &str = "/proc/self/exe";

/// Root of the process-count (`pids`) cgroup hierarchy.
pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup/pids";

/// Default cgroup leaf name.
pub const DEFAULT_CGROUP_NAME: &str = "corral";

/// Limit file holding the maximum process count.
pub const PIDS_MAX_FILE: &str = "pids.max";

/// Release-notification flag file.
pub const NOTIFY_ON_RELEASE_FILE: &str = "notify_on_release";

/// Membership file; writing a PID moves that process into the group.
pub const CGROUP_PROCS_FILE: &str = "cgroup.procs";

/// Default hostname inside the UTS namespace.
pub const DEFAULT_HOSTNAME: &str = "container";

/// Default maximum number of processes.
pub const DEFAULT_MAX_PROCS: u32 = 20;

/// Default size of the `/tmp` tmpfs (100 MiB).
pub const DEFAULT_TMP_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Default `PATH` handed to the target command.
pub const DEFAULT_PATH: &str = "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Default `HOME` handed to the target command.
pub const DEFAULT_HOME: &str = "HOME=/root";

/// Exit status of the bootstrapper when configuration or setup fails.
pub const BOOTSTRAP_FAILURE_EXIT_CODE: i32 = 125;

/// Exit status of the bootstrapper when the target program cannot be started.
pub const COMMAND_START_EXIT_CODE: i32 = 127;

/// Maximum hostname length accepted by `sethostname(2)`.
pub const MAX_HOSTNAME_LEN: usize = 64;

/// Application name used in logs and generated identifiers.
pub const APP_NAME: &str = "corral";
