//! Shared helpers for the CLI integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the CLI in-process with `pokerfelt` prepended to `args`.
pub fn run_cli(args: &[&str]) -> CliResult {
    let mut argv = vec!["pokerfelt"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let exit_code = pokerfelt_cli::run(argv, &mut out, &mut err);
    CliResult {
        exit_code,
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
    }
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Sets environment variables for the guard's lifetime, restoring the
/// previous values on drop. Tests using it must be `#[serial]`.
pub struct EnvGuard {
    restores: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn new() -> Self {
        EnvGuard {
            restores: Vec::new(),
        }
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.restores.push((key.to_string(), std::env::var(key).ok()));
        unsafe {
            std::env::set_var(key, value);
        }
        self
    }

    pub fn unset(mut self, key: &str) -> Self {
        self.restores.push((key.to_string(), std::env::var(key).ok()));
        unsafe {
            std::env::remove_var(key);
        }
        self
    }

    /// Clears every variable the config loader reads.
    pub fn clean() -> Self {
        [
            "POKERFELT_CONFIG",
            "POKERFELT_SERVER_URL",
            "POKERFELT_CHAT_HISTORY_LIMIT",
            "POKERFELT_RECONNECT_INITIAL_MS",
            "POKERFELT_RECONNECT_MAX_MS",
            "POKERFELT_RECORD_PATH",
        ]
        .iter()
        .fold(EnvGuard::new(), |guard, key| guard.unset(key))
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.restores.iter().rev() {
            unsafe {
                match previous {
                    Some(val) => std::env::set_var(key, val),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
