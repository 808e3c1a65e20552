//! Test support utilities for envdeck integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::net::TcpListener;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own project dir and data root. Child processes get
/// `ENVDECK_HOME` and `ENVDECK_PASSWORD` through `.env()`, so no
/// process-global state is mutated and tests can run in parallel.
pub struct Test {
    /// Temporary project directory
    pub dir: TempDir,
    /// Temporary data root
    pub home: TempDir,
    /// Password passed to every command
    pub password: String,
    /// Notifier port written to config.toml, free at creation time
    pub port: u16,
}

impl Test {
    /// Create a new empty test environment.
    ///
    /// Writes a config.toml pointing the notifier at a port nothing listens
    /// on, so commands never signal a notifier from another test.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        let port = free_port();
        std::fs::write(
            home.path().join("config.toml"),
            format!("[notifier]\nport = {}\ndebounce_ms = 50\n", port),
        )
        .expect("failed to write config.toml");

        Self {
            dir,
            home,
            password: PASSWORD.to_string(),
            port,
        }
    }

    /// Create a test environment with variables already set.
    pub fn with_variables(variables: &[(&str, &str)]) -> Self {
        let t = Self::new();
        for (k, v) in variables {
            let output = t.set(k, v);
            assert!(
                output.status.success(),
                "Failed to set variable {}: {}",
                k,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    /// Project directory as a path.
    pub fn project(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

/// A loopback port that was free when asked.
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("failed to find a free port")
}
