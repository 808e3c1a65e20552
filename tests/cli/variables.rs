//! Tests for `envdeck set/get/rm/list/history`.

use crate::support::*;
use std::fs;
use std::path::PathBuf;

/// Every variables.json under the data root.
fn store_files(t: &Test) -> Vec<PathBuf> {
    let projects = t.home.path().join("projects");
    fs::read_dir(projects)
        .unwrap()
        .map(|e| e.unwrap().path().join("variables.json"))
        .filter(|p| p.exists())
        .collect()
}

#[test]
fn test_set_and_get_roundtrip() {
    let t = Test::new();

    let output = t.set("DATABASE_URL", "postgres://localhost/db");
    assert_success(&output);
    assert_stdout_contains(&output, "DATABASE_URL");

    let output = t.get("DATABASE_URL");
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "postgres://localhost/db");
}

#[test]
fn test_standard_variables_roundtrip() {
    let t = Test::new();
    for (k, v) in STANDARD_VARIABLES {
        assert_roundtrip(&t, k, v);
    }
}

#[test]
fn test_set_overwrites() {
    let t = Test::with_variables(&[("PORT", "3000")]);

    assert_success(&t.set("PORT", "4000"));

    let output = t.get("PORT");
    assert_eq!(stdout(&output).trim_end(), "4000");
}

#[test]
fn test_sensitive_value_encrypted_on_disk() {
    let t = Test::new();

    let output = t.set_sensitive("API_KEY", "sk-live-abcdef");
    assert_success(&output);
    assert_stdout_contains(&output, "encrypted");

    let files = store_files(&t);
    assert_eq!(files.len(), 1);
    let raw = fs::read_to_string(&files[0]).unwrap();
    assert!(raw.contains("API_KEY"));
    assert!(!raw.contains("sk-live-abcdef"));

    let output = t.get("API_KEY");
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "sk-live-abcdef");
}

#[test]
fn test_list_masks_sensitive_values() {
    let t = Test::with_variables(&[("PORT", "3000")]);
    assert_success(&t.set_sensitive("API_KEY", "sk-live-abcdef"));

    let output = t.list();
    assert_success(&output);
    assert_stdout_contains(&output, "PORT");
    assert_stdout_contains(&output, "3000");
    assert_stdout_contains(&output, "API_KEY");
    assert_stdout_excludes(&output, "sk-live-abcdef");

    let output = t.cmd().args(["list", "--reveal"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "sk-live-abcdef");
}

#[test]
fn test_list_json() {
    let t = Test::with_variables(&[("B_KEY", "b"), ("A_KEY", "a")]);

    let output = t.list_json();
    assert_success(&output);
    let json = stdout_json(&output);

    assert_eq!(json["branch"], "main");
    assert_eq!(json["count"], 2);
    let names: Vec<&str> = json["variables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A_KEY", "B_KEY"]);
}

#[test]
fn test_list_empty() {
    let t = Test::new();

    let output = t.list();
    assert_success(&output);
    assert_stdout_contains(&output, "no variables");
}

#[test]
fn test_set_with_category_and_description() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["set", "DB_HOST", "localhost", "-c", "database", "-d", "primary host"])
        .output()
        .unwrap();
    assert_success(&output);

    let json = stdout_json(&t.list_json());
    assert_eq!(json["variables"][0]["category"], "database");
    assert_eq!(json["variables"][0]["description"], "primary host");
}

#[test]
fn test_rm_removes_variable() {
    let t = Test::with_variables(&[("TEMP", "x")]);

    let output = t.rm("TEMP");
    assert_success(&output);
    assert_stdout_contains(&output, "removed");

    assert_failure(&t.get("TEMP"));
}

#[test]
fn test_history_records_changes() {
    let t = Test::with_variables(&[("PORT", "3000")]);
    assert_success(&t.set("PORT", "4000"));
    assert_success(&t.rm("PORT"));

    let output = t.history();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("create"));
    assert!(out.contains("update"));
    assert!(out.contains("delete"));
    // newest first
    assert!(out.find("delete").unwrap() < out.find("create").unwrap());
}

#[test]
fn test_history_limit() {
    let t = Test::with_variables(&[("A", "1"), ("B", "2"), ("C", "3")]);

    let output = t.cmd().args(["history", "-n", "1"]).output().unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output).matches('•').count(), 1);
}

#[test]
fn test_branches_are_isolated() {
    let t = Test::with_variables(&[("PORT", "3000")]);

    let output = t
        .bare_cmd()
        .env("ENVDECK_PASSWORD", PASSWORD)
        .arg("-C")
        .arg(t.dir.path())
        .args(["-b", "feature", "get", "PORT"])
        .output()
        .unwrap();
    assert_failure(&output);

    let output = t
        .bare_cmd()
        .env("ENVDECK_PASSWORD", PASSWORD)
        .env("ENVDECK_BRANCH", "feature")
        .arg("-C")
        .arg(t.dir.path())
        .args(["set", "PORT", "5000"])
        .output()
        .unwrap();
    assert_success(&output);

    assert_eq!(stdout(&t.get("PORT")).trim_end(), "3000");
}
