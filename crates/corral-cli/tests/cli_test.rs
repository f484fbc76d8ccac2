//! Tests that drive the `corral` binary as a user would.
//!
//! Only the last test creates namespaces; it needs root and a prepared
//! root filesystem and is ignored by default.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::process::{Command, Output};

fn corral(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_corral"))
        .args(args)
        .env_remove("CORRAL_CONFIG")
        .env_remove("CORRAL_CONFIG_FILE")
        .env("RUST_LOG", "error")
        .output()
        .expect("corral binary should start")
}

#[test]
fn plan_prints_resolved_configuration_as_json() {
    let output = corral(&[
        "plan", "--json", "--rootfs", "/srv/rootfs", "--cgroup-name", "planned", "--max-procs",
        "7", "--", "/bin/echo", "hello",
    ]);
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["command"], serde_json::json!(["/bin/echo", "hello"]));
    assert_eq!(config["cgroup_name"], "planned");
    assert_eq!(config["max_procs"], 7);
    assert_eq!(config["hostname"], "container");
}

#[test]
fn plan_rejects_invalid_configuration_without_printing_it() {
    let output = corral(&[
        "plan", "--json", "--rootfs", "/srv/rootfs", "--max-procs", "0", "--", "/bin/sh",
    ]);
    assert_eq!(output.status.code(), Some(125));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max"));
}

#[test]
fn run_without_command_fails_before_isolation() {
    let output = corral(&["run", "--rootfs", "/srv/rootfs"]);
    assert_eq!(output.status.code(), Some(125));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("command is empty"));
}

#[test]
fn bootstrap_mode_without_handover_reports_setup_failure() {
    let output = corral(&["__corral-init", "/bin/true"]);
    assert_eq!(output.status.code(), Some(125));
}

#[test]
#[ignore = "needs root and a root filesystem in CORRAL_TEST_ROOTFS"]
fn run_echo_in_container() {
    let rootfs = std::env::var("CORRAL_TEST_ROOTFS").unwrap();
    let output = corral(&[
        "run", "--rootfs", &rootfs, "--max-procs", "10", "--", "/bin/echo", "hello",
    ]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");
}
