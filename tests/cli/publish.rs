//! Tests for `envdeck publish` and `envdeck versions`.

use crate::support::*;

#[test]
fn test_publish_applies_and_records_version() {
    let t = Test::with_variables(&[("PORT", "3000")]);

    let output = t.publish(&["PORT=4000", "HOST=localhost"], "bump port");
    assert_success(&output);
    assert_stdout_contains(&output, "published version");

    assert_eq!(stdout(&t.get("PORT")).trim_end(), "4000");
    assert_eq!(stdout(&t.get("HOST")).trim_end(), "localhost");

    let versions = stdout_json(&t.versions_json());
    let versions = versions.as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["description"], "bump port");
    assert_eq!(versions[0]["variable_count"], 2);
    assert_eq!(versions[0]["published"], true);

    let changes = versions[0]["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0]["name"], "PORT");
    assert_eq!(changes[0]["type"], "update");
    assert_eq!(changes[0]["old_value"], "3000");
    assert_eq!(changes[1]["type"], "create");
}

#[test]
fn test_publish_delete() {
    let t = Test::with_variables(&[("OLD_FLAG", "1"), ("KEEP", "x")]);

    let output = t
        .cmd()
        .args(["publish", "--delete", "OLD_FLAG", "-m", "cleanup"])
        .output()
        .unwrap();
    assert_success(&output);

    assert_failure(&t.get("OLD_FLAG"));
    assert_success(&t.get("KEEP"));
}

#[test]
fn test_publish_sensitive_masks_version_values() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["publish", "TOKEN=hunter2", "--sensitive", "-m", "token"])
        .output()
        .unwrap();
    assert_success(&output);

    assert_eq!(stdout(&t.get("TOKEN")).trim_end(), "hunter2");
    let output = t.versions_json();
    assert_stdout_excludes(&output, "hunter2");
}

#[test]
fn test_version_labels_increase() {
    let t = Test::new();
    assert_success(&t.publish(&["A=1"], "first"));
    assert_success(&t.publish(&["A=2"], "second"));

    let versions = stdout_json(&t.versions_json());
    let versions = versions.as_array().unwrap();
    assert_eq!(versions.len(), 2);
    // newest first
    assert_eq!(versions[0]["description"], "second");
    let newest = versions[0]["version"].as_str().unwrap();
    let oldest = versions[1]["version"].as_str().unwrap();
    assert!(newest > oldest, "{} should sort after {}", newest, oldest);
}

#[test]
fn test_publish_without_changes_fails() {
    let t = Test::new();

    let output = t.cmd().arg("publish").output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "nothing to publish");
}

#[test]
fn test_publish_rejects_malformed_assignment() {
    let t = Test::new();

    let output = t.publish(&["NOVALUE"], "broken");
    assert_failure(&output);
    assert_stderr_contains(&output, "expected KEY=VALUE");
}

#[test]
fn test_versions_empty() {
    let t = Test::new();

    let output = t.cmd().arg("versions").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "no versions");
}
