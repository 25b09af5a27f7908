//! Common test utilities for TUI tests.

use std::path::Path;
use std::process::Command;

/// Settings that would otherwise leak in from the developer's environment.
const ISOLATED_VARS: &[&str] = &[
    "MONK_BINARY",
    "MONK_TIMEOUT",
    "OVERSEER_ALWAYS",
    "DEFAULT_TENANT",
    "DEFAULT_USERNAME",
    "DEV_START_SCREEN",
    "DEV_MOCK_AUTH",
    "DEBUG",
    "RUST_LOG",
];

/// Runs vault-tec in headless mode with the given arguments.
///
/// The process runs inside `workdir` (so no stray `.env` is picked up) with
/// a config file path that does not exist.
pub fn run_headless(workdir: &Path, args: &[&str]) -> (i32, String, String) {
    let config = workdir.join("missing-config.toml");
    let mut command = Command::new(env!("CARGO_BIN_EXE_vault-tec"));
    command
        .current_dir(workdir)
        .arg("--headless")
        .arg("--config")
        .arg(&config)
        .args(args);
    for var in ISOLATED_VARS {
        command.env_remove(var);
    }

    let output = command.output().expect("Failed to execute vault-tec");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}
