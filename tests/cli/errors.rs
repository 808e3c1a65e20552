//! Error paths and global behavior.

use crate::support::*;

#[test]
fn test_wrong_password_rejected() {
    let t = Test::with_variables(&[("PORT", "3000")]);

    let output = t
        .cmd()
        .env("ENVDECK_PASSWORD", "wrong")
        .args(["get", "PORT"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "not authenticated");
}

#[test]
fn test_missing_password_without_terminal() {
    let t = Test::new();

    let output = t
        .bare_cmd()
        .arg("-C")
        .arg(t.dir.path())
        .arg("list")
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "password cannot be empty");
}

#[test]
fn test_serve_requires_password() {
    let t = Test::with_variables(&[("PORT", "3000")]);

    let output = t
        .bare_cmd()
        .env("ENVDECK_PASSWORD", "wrong")
        .args(["serve", "--port", "0"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "not authenticated");

    let output = t
        .bare_cmd()
        .args(["serve", "--port", "0"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "password cannot be empty");
}

#[test]
fn test_get_missing_variable() {
    let t = Test::new();

    let output = t.get("NOPE");
    assert_failure(&output);
    assert_stderr_contains(&output, "variable not found");
    assert_stderr_contains(&output, "envdeck list");
}

#[test]
fn test_rm_missing_variable() {
    let t = Test::new();

    let output = t.rm("NOPE");
    assert_failure(&output);
    assert_stderr_contains(&output, "variable not found");
}

#[test]
fn test_invalid_names_rejected() {
    let t = Test::new();

    assert_failure(&t.set("123BAD", "value"));
    assert_failure(&t.set("", "value"));
    assert_failure(&t.set("HAS SPACE", "value"));
}

#[test]
fn test_sensitive_and_plain_conflict() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["set", "KEY", "v", "--sensitive", "--plain"])
        .output()
        .unwrap();
    assert_failure(&output);
}

#[test]
fn test_invalid_config_reported() {
    let t = Test::new();
    std::fs::write(
        t.home.path().join("config.toml"),
        "[notifier]\nmode = \"command\"\n",
    )
    .unwrap();

    let output = t.list();
    assert_failure(&output);
    assert_stderr_contains(&output, "notifier.command");
}

#[test]
fn test_completions() {
    let t = Test::new();

    let output = t.bare_cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "envdeck");
}

#[test]
fn test_help() {
    let t = Test::new();

    t.bare_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("publish"))
        .stdout(predicates::str::contains("snapshot"));
}
