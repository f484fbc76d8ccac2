//! Detects which phase the running binary is in.

use corral_common::constants::INIT_MARKER;

/// Role of the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Original invocation: parse the CLI and launch a container.
    Launch,
    /// Re-executed by the launcher: bootstrap and run `command`.
    Bootstrap {
        /// Target command following the marker.
        command: Vec<String>,
    },
}

impl Mode {
    /// Inspects a full argument vector (including the program name).
    pub fn detect<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter().skip(1);
        match args.next() {
            Some(first) if first == INIT_MARKER => Self::Bootstrap {
                command: args.collect(),
            },
            _ => Self::Launch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn marker_selects_bootstrap_with_remaining_command() {
        let mode = Mode::detect(args(&["corral", "__corral-init", "/bin/echo", "hi"]));
        assert_eq!(
            mode,
            Mode::Bootstrap {
                command: args(&["/bin/echo", "hi"])
            }
        );
    }

    #[test]
    fn regular_invocation_launches() {
        assert_eq!(Mode::detect(args(&["corral", "run", "/bin/sh"])), Mode::Launch);
        assert_eq!(Mode::detect(args(&["corral"])), Mode::Launch);
    }

    #[test]
    fn marker_only_counts_as_first_argument() {
        let mode = Mode::detect(args(&["corral", "run", "__corral-init"]));
        assert_eq!(mode, Mode::Launch);
    }

    #[test]
    fn marker_without_command_yields_empty_command() {
        let mode = Mode::detect(args(&["corral", "__corral-init"]));
        assert_eq!(mode, Mode::Bootstrap { command: Vec::new() });
    }
}
