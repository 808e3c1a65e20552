//! Tests for `envdeck passwd`.

use crate::support::*;

#[test]
fn test_passwd_rekeys_sensitive_values() {
    let t = Test::with_variables(&[("PORT", "3000")]);
    assert_success(&t.set_sensitive("API_KEY", "sk-live-abcdef"));

    let output = t
        .cmd()
        .env("ENVDECK_NEW_PASSWORD", "battery-staple")
        .arg("passwd")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "password changed");

    // old password no longer works
    assert_failure(&t.get("PORT"));

    let output = t
        .cmd()
        .env("ENVDECK_PASSWORD", "battery-staple")
        .args(["get", "API_KEY"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "sk-live-abcdef");
}

#[test]
fn test_passwd_rekeys_other_projects() {
    let t = Test::new();
    let other = tempfile::TempDir::new().unwrap();
    let in_other = |args: &[&str], password: &str| {
        t.bare_cmd()
            .env("ENVDECK_PASSWORD", password)
            .arg("-C")
            .arg(other.path())
            .args(["-b", "main"])
            .args(args)
            .output()
            .unwrap()
    };
    assert_success(&in_other(&["set", "DB_PASS", "hunter2", "--sensitive"], &t.password));

    let output = t
        .cmd()
        .env("ENVDECK_NEW_PASSWORD", "battery-staple")
        .arg("passwd")
        .output()
        .unwrap();
    assert_success(&output);

    let output = in_other(&["get", "DB_PASS"], "battery-staple");
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "hunter2");
}

#[test]
fn test_passwd_rejects_empty() {
    let t = Test::new();

    let output = t
        .cmd()
        .env("ENVDECK_NEW_PASSWORD", "")
        .arg("passwd")
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "password cannot be empty");
}
