//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create an envdeck command scoped to this test.
    ///
    /// Returns a Command configured with:
    /// - ENVDECK_HOME set to the temporary data root
    /// - ENVDECK_PASSWORD set to the test password
    /// - `-C <project> -b main`
    pub fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.env("ENVDECK_PASSWORD", &self.password);
        cmd.arg("-C").arg(self.dir.path()).args(["-b", "main"]);
        cmd
    }

    /// An envdeck command with only the data root set.
    pub fn bare_cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("envdeck").expect("failed to find envdeck binary");
        cmd.env("ENVDECK_HOME", self.home.path());
        cmd.env_remove("ENVDECK_PASSWORD");
        cmd.env_remove("ENVDECK_NEW_PASSWORD");
        cmd.env_remove("ENVDECK_BRANCH");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `envdeck set`.
    pub fn set(&self, key: &str, val: &str) -> Output {
        self.cmd()
            .args(["set", key, val])
            .output()
            .expect("failed to run envdeck set")
    }

    /// Shortcut for `envdeck set --sensitive`.
    pub fn set_sensitive(&self, key: &str, val: &str) -> Output {
        self.cmd()
            .args(["set", key, val, "--sensitive"])
            .output()
            .expect("failed to run envdeck set --sensitive")
    }

    /// Shortcut for `envdeck get`.
    pub fn get(&self, key: &str) -> Output {
        self.cmd()
            .args(["get", key])
            .output()
            .expect("failed to run envdeck get")
    }

    /// Shortcut for `envdeck rm`.
    pub fn rm(&self, key: &str) -> Output {
        self.cmd()
            .args(["rm", key])
            .output()
            .expect("failed to run envdeck rm")
    }

    /// Shortcut for `envdeck list`.
    pub fn list(&self) -> Output {
        self.cmd()
            .arg("list")
            .output()
            .expect("failed to run envdeck list")
    }

    /// Shortcut for `envdeck list --json`.
    pub fn list_json(&self) -> Output {
        self.cmd()
            .args(["list", "--json"])
            .output()
            .expect("failed to run envdeck list --json")
    }

    /// Shortcut for `envdeck history`.
    pub fn history(&self) -> Output {
        self.cmd()
            .arg("history")
            .output()
            .expect("failed to run envdeck history")
    }

    /// Shortcut for `envdeck publish KEY=VALUE... -m message`.
    pub fn publish(&self, assignments: &[&str], message: &str) -> Output {
        self.cmd()
            .arg("publish")
            .args(assignments)
            .args(["-m", message])
            .output()
            .expect("failed to run envdeck publish")
    }

    /// Shortcut for `envdeck versions --json`.
    pub fn versions_json(&self) -> Output {
        self.cmd()
            .args(["versions", "--json"])
            .output()
            .expect("failed to run envdeck versions --json")
    }

    /// Shortcut for `envdeck snapshot create`.
    pub fn snapshot_create(&self, name: &str) -> Output {
        self.cmd()
            .args(["snapshot", "create", name])
            .output()
            .expect("failed to run envdeck snapshot create")
    }

    /// Shortcut for `envdeck snapshot restore`.
    pub fn snapshot_restore(&self, id: &str) -> Output {
        self.cmd()
            .args(["snapshot", "restore", id])
            .output()
            .expect("failed to run envdeck snapshot restore")
    }
}
