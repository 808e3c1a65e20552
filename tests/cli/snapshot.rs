//! Tests for `envdeck snapshot`.

use crate::support::*;

/// The id printed by `snapshot create`.
fn created_id(output: &std::process::Output) -> String {
    stdout(output)
        .lines()
        .find_map(|line| line.trim().strip_prefix("id").map(|rest| rest.trim().to_string()))
        .expect("snapshot id not printed")
}

#[test]
fn test_snapshot_restore_roundtrip() {
    let t = Test::with_variables(&[("PORT", "3000"), ("HOST", "a")]);

    let output = t.snapshot_create("baseline");
    assert_success(&output);
    assert_stdout_contains(&output, "2 variables");
    let id = created_id(&output);

    assert_success(&t.set("PORT", "9999"));
    assert_success(&t.rm("HOST"));
    assert_success(&t.set("EXTRA", "x"));

    let output = t.snapshot_restore(&id);
    assert_success(&output);
    assert_stderr_contains(&output, "undo with");

    assert_eq!(stdout(&t.get("PORT")).trim_end(), "3000");
    assert_eq!(stdout(&t.get("HOST")).trim_end(), "a");
    assert_failure(&t.get("EXTRA"));
}

#[test]
fn test_snapshot_list_includes_backup_after_restore() {
    let t = Test::with_variables(&[("PORT", "3000")]);
    let id = created_id(&t.snapshot_create("baseline"));
    assert_success(&t.snapshot_restore(&id));

    let output = t.cmd().args(["snapshot", "list"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "2 snapshots");
    assert_stdout_contains(&output, "Backup before restoring baseline");
}

#[test]
fn test_snapshot_restore_unknown_fails() {
    let t = Test::new();

    let output = t.snapshot_restore("no-such-id");
    assert_failure(&output);
    assert_stderr_contains(&output, "snapshot not found");
}

#[test]
fn test_snapshot_rm() {
    let t = Test::with_variables(&[("PORT", "3000")]);
    let id = created_id(&t.snapshot_create("baseline"));

    let output = t.cmd().args(["snapshot", "rm", &id]).output().unwrap();
    assert_success(&output);

    let output = t.cmd().args(["snapshot", "list"]).output().unwrap();
    assert_stdout_contains(&output, "no snapshots");
}
