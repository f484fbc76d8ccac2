//! UTS namespace isolation.
//!
//! Allows the container to have its own hostname.

use corral_common::error::{CorralError, Result};

/// Sets the hostname inside the UTS namespace.
///
/// Only affects the host when called outside a private UTS namespace.
///
/// # Errors
///
/// Returns an error if `sethostname(2)` fails.
#[cfg(target_os = "linux")]
pub fn set_hostname(hostname: &str) -> Result<()> {
    nix::unistd::sethostname(hostname)
        .map_err(|e| CorralError::setup("sethostname", hostname, e))?;
    tracing::debug!(hostname, "container hostname set");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: UTS namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn set_hostname(_hostname: &str) -> Result<()> {
    Err(CorralError::config(
        "Linux required for native container operations",
    ))
}
