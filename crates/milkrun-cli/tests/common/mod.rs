#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

/// The CLI command with an isolated data directory and server.
pub fn cli_command(args: &[&str], data_dir: &Path, server: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_milkrun"));
    cmd.args(args);
    cmd.env("MILKRUN_DATA_DIR", data_dir);
    cmd.env("MILKRUN_SERVER", server);
    cmd.env("MILKRUN_TIMEOUT", "2");
    cmd.env("HOME", data_dir);
    cmd.env("XDG_DATA_HOME", data_dir.join("xdg"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("MILKRUN_PASSWORD");
    cmd
}

/// Run the CLI against an isolated data directory and server.
pub fn run_cli_with_env(args: &[&str], data_dir: &Path, server: &str) -> Output {
    cli_command(args, data_dir, server)
        .output()
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_with_env_success(args: &[&str], data_dir: &Path, server: &str) -> String {
    let output = run_cli_with_env(args, data_dir, server);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_with_env_failure(args: &[&str], data_dir: &Path, server: &str) -> String {
    let output = run_cli_with_env(args, data_dir, server);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A server URL on a local port nothing listens on.
pub fn unreachable_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

/// Parse `list --json` output, one record per line.
pub fn parse_records(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("invalid JSON line"))
        .collect()
}
