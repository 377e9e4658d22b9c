//! E2E tests for `wim plan` and `wim replay`.
//!
//! Covers text and JSON output, format selection for configs, and the
//! failure paths for broken configs and exports.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn wim_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wim"));
    cmd.current_dir(dir);
    cmd.env("WIMIG_LOG", "error");
    cmd
}

const EXPORT: &str = r#"[
  {"origin_id": "PROJ-1", "type": "Epic", "revisions": [
    {"time": "2024-03-01T09:00:00Z", "fields": {"summary": "Platform", "points": 8.5, "flagged": false}}
  ]},
  {"origin_id": "PROJ-2", "type": "Story", "parent": "PROJ-1", "revisions": [
    {"time": "2024-03-01T10:00:00Z", "fields": {"parent": 10001}},
    {"time": "2024-03-02T10:00:00Z", "fields": {"parent": null}}
  ]},
  {"origin_id": "PROJ-3", "type": "Story", "revisions": [
    {"time": "2024-03-01T11:00:00Z", "fields": {"parent": "PROJ-1"}}
  ]}
]"#;

const CONFIG_TOML: &str = r#"
[link_map]
links = [{ source = "Parent", target = "Hierarchy-Reverse" }]

[[link_rules]]
field = "parent"
link_type = "Parent"
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn fixtures() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let export = write(dir.path(), "export.json", EXPORT);
    let config = write(dir.path(), "migration.toml", CONFIG_TOML);
    (dir, export, config)
}

// ---------------------------------------------------------------------------
// wim plan
// ---------------------------------------------------------------------------

#[test]
fn plan_prints_global_order() {
    let (dir, export, _) = fixtures();
    let output = wim_cmd(dir.path())
        .args(["plan", "--input"])
        .arg(&export)
        .output()
        .expect("plan should not crash");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("PROJ-1 @rev 0"));
    assert!(lines[1].starts_with("PROJ-2 @rev 0"));
    assert!(lines[2].starts_with("PROJ-3 @rev 0"));
    assert!(lines[3].starts_with("PROJ-2 @rev 1"));
    assert!(lines[3].ends_with("(final)"));
}

#[test]
fn plan_json_lists_references() {
    let (dir, export, _) = fixtures();
    let output = wim_cmd(dir.path())
        .args(["plan", "--json", "--input"])
        .arg(&export)
        .output()
        .expect("plan should not crash");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let refs = json.as_array().expect("array");
    assert_eq!(refs.len(), 4);
    assert_eq!(refs[3]["origin_id"], "PROJ-2");
    assert_eq!(refs[3]["rev_index"], 1);
    assert_eq!(refs[3]["is_final"], true);
    assert_eq!(refs[1]["is_final"], false);
}

// ---------------------------------------------------------------------------
// wim replay
// ---------------------------------------------------------------------------

#[test]
fn replay_prints_link_mutations_in_order() {
    let (dir, export, config) = fixtures();
    wim_cmd(dir.path())
        .args(["replay", "--input"])
        .arg(&export)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "+ PROJ-2 -> PROJ-1 [Hierarchy-Reverse] @rev 0\n\
             + PROJ-3 -> PROJ-1 [Hierarchy-Reverse] @rev 0\n\
             - PROJ-2 -> PROJ-1 [Hierarchy-Reverse] @rev 1\n",
        ))
        .stdout(predicate::str::contains(
            "replayed 4 revisions across 3 items: 2 added, 1 removed",
        ));
}

#[test]
fn replay_json_report() {
    let (dir, export, config) = fixtures();
    let output = wim_cmd(dir.path())
        .args(["--json", "replay", "--input"])
        .arg(&export)
        .arg("--config")
        .arg(&config)
        .output()
        .expect("replay should not crash");
    assert!(
        output.status.success(),
        "replay failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["revisions"], 4);
    assert_eq!(json["links_added"], 2);
    assert_eq!(json["links_removed"], 1);

    let steps = json["steps"].as_array().expect("steps");
    let first_link = &steps[1]["links"][0];
    assert_eq!(first_link["change"], "added");
    assert_eq!(first_link["source_origin_id"], "PROJ-2");
    assert_eq!(first_link["target_origin_id"], "PROJ-1");
    assert_eq!(first_link["wi_type"], "Hierarchy-Reverse");
}

#[test]
fn replay_accepts_json_config() {
    let (dir, export, _) = fixtures();
    let config = write(
        dir.path(),
        "migration.json",
        r#"{"link-map": {"link": [{"source": "Parent", "target": "Child"}]},
            "link_rules": [{"field": "parent", "link_type": "Parent", "mapper": "add"}]}"#,
    );
    wim_cmd(dir.path())
        .args(["replay", "--input"])
        .arg(&export)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("+ PROJ-3 -> PROJ-1 [Child] @rev 0"))
        // add-only rules take the raw field value
        .stdout(predicate::str::contains("+ PROJ-2 -> 10001 [Child] @rev 0"))
        .stdout(predicate::str::contains("- PROJ-2").not());
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[test]
fn blank_rule_fails_before_replay() {
    let (dir, export, _) = fixtures();
    let config = write(
        dir.path(),
        "broken.toml",
        "[[link_rules]]\nfield = \"parent\"\nlink_type = \" \"\n",
    );
    wim_cmd(dir.path())
        .args(["replay", "--input"])
        .arg(&export)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1003]: Link rule has a blank link type"))
        .stderr(predicate::str::contains("broken.toml"))
        .stderr(predicate::str::contains("hint: "));
}

#[test]
fn json_mode_reports_error_code_on_stderr() {
    let (dir, export, _) = fixtures();
    let config = write(
        dir.path(),
        "broken.toml",
        "[[link_rules]]\nfield = \" \"\nlink_type = \"Parent\"\n",
    );
    let output = wim_cmd(dir.path())
        .args(["--json", "replay", "--input"])
        .arg(&export)
        .arg("--config")
        .arg(&config)
        .output()
        .expect("replay should not crash");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let json: Value = serde_json::from_slice(&output.stderr).expect("valid JSON on stderr");
    assert_eq!(json["error"]["error_code"], "E1002");
    assert!(json["error"]["message"].as_str().expect("message").contains("broken.toml"));
    assert!(json["error"]["suggestion"].is_string());
}

#[test]
fn malformed_export_fails() {
    let (dir, _, config) = fixtures();
    let export = write(dir.path(), "bad.json", "{\"not\": \"an array\"}");
    wim_cmd(dir.path())
        .args(["replay", "--input"])
        .arg(&export)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1004]"))
        .stderr(predicate::str::contains("bad.json"));
}

#[test]
fn missing_export_fails() {
    let (dir, _, config) = fixtures();
    wim_cmd(dir.path())
        .args(["replay", "--input", "nope.json", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: failed to read export"))
        .stderr(predicate::str::contains("nope.json"));
}
