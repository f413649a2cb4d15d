//! End-to-end tests for the invnorm binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn invnorm() -> Command {
    Command::cargo_bin("invnorm").unwrap()
}

fn write_payload(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn normalize_prints_json_invoice() {
    let dir = TempDir::new().unwrap();
    let payload = write_payload(
        &dir,
        "inv.json",
        r#"{"vendor_name": "Acme Industrial", "invoice_number": "INV-001", "total": "1000.50"}"#,
    );

    invnorm()
        .arg("normalize")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Industrial"))
        .stdout(predicate::str::contains("INV-001"))
        .stdout(predicate::str::contains("1000.5"));
}

#[test]
fn normalize_text_format() {
    let dir = TempDir::new().unwrap();
    let payload = write_payload(&dir, "inv.json", r#"{"vendor_name": "Acme"}"#);

    invnorm()
        .args(["normalize", "--format", "text"])
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Vendor:  Acme"));
}

#[test]
fn normalize_missing_input_fails() {
    invnorm()
        .args(["normalize", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn normalize_invalid_json_fails() {
    let dir = TempDir::new().unwrap();
    let payload = write_payload(&dir, "bad.json", "{not json");

    invnorm()
        .arg("normalize")
        .arg(&payload)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn normalize_non_object_payload_still_succeeds() {
    // A valid-JSON-but-not-object payload normalizes to an error-marked
    // invoice rather than failing the command.
    let dir = TempDir::new().unwrap();
    let payload = write_payload(&dir, "scalar.json", "42");

    invnorm()
        .arg("normalize")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"error\""));
}

#[test]
fn normalize_with_vendor_mappings_file() {
    let dir = TempDir::new().unwrap();
    let mappings = write_payload(
        &dir,
        "mappings.json",
        r#"[{
            "vendor_name": "Globex",
            "field_mappings": "{\"line_items\": {\"description\": [\"work_done\"]}}"
        }]"#,
    );
    let payload = write_payload(
        &dir,
        "inv.json",
        r#"{"vendor_name": "Globex", "line_items": [{"work_done": "Install"}]}"#,
    );

    invnorm()
        .arg("--mappings")
        .arg(&mappings)
        .arg("normalize")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Install"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let a = write_payload(&dir, "a.json", r#"{"vendor_name": "Acme", "total": 10}"#);
    let b = write_payload(&dir, "b.json", "{not json");
    let out = dir.path().join("out");

    invnorm()
        .arg("batch")
        .arg(&a)
        .arg(&b)
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .arg("--continue-on-error")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(out.join("a.json").exists());
    assert!(!out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.json,success,Acme"));
    assert!(summary.contains("b.json,error"));
}

#[test]
fn batch_stops_on_error_by_default() {
    let dir = TempDir::new().unwrap();
    let bad = write_payload(&dir, "bad.json", "{not json");

    invnorm().arg("batch").arg(&bad).assert().failure();
}

#[test]
fn mappings_validate_reports_broken_records() {
    let dir = TempDir::new().unwrap();
    let mappings = write_payload(
        &dir,
        "mappings.json",
        r#"[
            {"vendor_name": "Acme", "field_mappings": "{\"invoice_number\": [\"ref\"]}"},
            {"vendor_name": "Globex", "field_mappings": "{broken"}
        ]"#,
    );

    invnorm()
        .arg("--mappings")
        .arg(&mappings)
        .args(["mappings", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Globex"))
        .stdout(predicate::str::contains("falls back"));
}

#[test]
fn mappings_default_shows_builtin_mapping() {
    invnorm()
        .args(["mappings", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice_number"))
        .stdout(predicate::str::contains("Regex patterns:"));
}
