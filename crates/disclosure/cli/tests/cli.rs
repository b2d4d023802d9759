//! End-to-end tests for the `disclosure` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const GOV: &str = "OrgGovMSP";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn disclosure(dir: &Path, org: &str) -> Command {
    let mut cmd = Command::cargo_bin("disclosure").unwrap();
    cmd.env("DISCLOSURE_CONFIG", dir.join("absent.toml"))
        .env_remove("DISCLOSURE_ORG")
        .env_remove("DISCLOSURE_LEDGER")
        .env_remove("RUST_LOG")
        .arg("--ledger")
        .arg(dir.join("ledger.json"))
        .arg("--org")
        .arg(org)
        .arg("--timestamp")
        .arg("2025-03-01T09:00:00Z");
    cmd
}

fn json(dir: &Path, org: &str, args: &[&str]) -> Value {
    let output = disclosure(dir, org).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn register(dir: &Path, banks: &[(&str, &str)]) {
    for (id, name) in banks {
        json(dir, GOV, &["register-bank", id, name]);
    }
}

fn ids(records: &Value) -> Vec<String> {
    let mut ids: Vec<String> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn full_lifecycle_persists_between_invocations() {
    let dir = TempDir::new().unwrap();
    register(
        dir.path(),
        &[("Bank1MSP", "First Bank"), ("Bank2MSP", "Second Bank"), ("Bank3MSP", "Third Bank")],
    );

    let record = json(
        dir.path(),
        "Bank1MSP",
        &["submit", "R1", "--data-hash", "abc123", "--summary", "Exposure"],
    );
    assert_eq!(record["state"], "SUBMITTED");
    assert_eq!(record["submittedBy"], "First Bank");
    assert_eq!(record["dataHash"], "abc123");

    let record = json(dir.path(), GOV, &["gov-verify", "R1"]);
    assert_eq!(record["state"], "GOV_VERIFIED");

    // two eligible banks, ceil(0.51 * 2) = 2
    let record = json(dir.path(), "Bank2MSP", &["vote", "R1"]);
    assert_eq!(record["requiredApproval"], 2);
    assert_eq!(record["state"], "GOV_VERIFIED");

    let record = json(dir.path(), "Bank3MSP", &["vote", "R1"]);
    assert_eq!(record["state"], "OFFICIAL");
    assert_eq!(record["approvedBanks"], serde_json::json!(["Second Bank", "Third Bank"]));

    let official = json(dir.path(), "Bank1MSP", &["query", "official"]);
    assert_eq!(ids(&official), vec!["R1"]);
    let read = json(dir.path(), "Bank1MSP", &["read", "R1"]);
    assert_eq!(read, record);
}

#[test]
fn query_accepts_dashed_state() {
    let dir = TempDir::new().unwrap();
    json(dir.path(), "Bank1MSP", &["submit", "R1"]);
    json(dir.path(), "Bank1MSP", &["submit", "R2"]);
    json(dir.path(), GOV, &["gov-verify", "R2"]);

    assert_eq!(ids(&json(dir.path(), GOV, &["query", "submitted"])), vec!["R1"]);
    assert_eq!(ids(&json(dir.path(), GOV, &["query", "gov-verified"])), vec!["R2"]);
}

#[test]
fn rejected_operation_leaves_ledger_file_untouched() {
    let dir = TempDir::new().unwrap();
    json(dir.path(), "Bank1MSP", &["submit", "R1"]);
    let before = std::fs::read(dir.path().join("ledger.json")).unwrap();

    disclosure(dir.path(), "Bank2MSP")
        .args(["submit", "R1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    disclosure(dir.path(), "Bank2MSP")
        .args(["gov-verify", "R1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not authorized"));

    let after = std::fs::read(dir.path().join("ledger.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn concurrent_writer_blocks_save() {
    let dir = TempDir::new().unwrap();
    register(dir.path(), &[("Bank2MSP", "Second Bank"), ("Bank3MSP", "Third Bank")]);
    json(dir.path(), "Bank1MSP", &["submit", "R1"]);
    json(dir.path(), GOV, &["gov-verify", "R1"]);
    let before = std::fs::read(dir.path().join("ledger.json")).unwrap();

    // another invocation is mid-save
    let lock = dir.path().join("ledger.json.lock");
    std::fs::write(&lock, b"").unwrap();
    disclosure(dir.path(), "Bank2MSP")
        .args(["vote", "R1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("being written by another invocation"));
    assert_eq!(std::fs::read(dir.path().join("ledger.json")).unwrap(), before);

    std::fs::remove_file(&lock).unwrap();
    let record = json(dir.path(), "Bank2MSP", &["vote", "R1"]);
    assert_eq!(record["approvalCount"], 1);
}

#[test]
fn read_only_commands_do_not_create_ledger() {
    let dir = TempDir::new().unwrap();

    let directory = json(dir.path(), "Bank1MSP", &["directory"]);
    assert_eq!(directory["orgs"], serde_json::json!({}));
    assert!(!dir.path().join("ledger.json").exists());
}

#[test]
fn unknown_record_not_found() {
    let dir = TempDir::new().unwrap();

    disclosure(dir.path(), "Bank1MSP")
        .args(["read", "R404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("record not found: R404"));
}

#[test]
fn config_file_sets_government() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[contract]\ngovernment_org = \"RegulatorMSP\"\n").unwrap();

    json(dir.path(), "Bank1MSP", &["submit", "R1"]);

    disclosure(dir.path(), GOV)
        .env("DISCLOSURE_CONFIG", &config)
        .args(["gov-verify", "R1"])
        .assert()
        .failure();

    let output = disclosure(dir.path(), "RegulatorMSP")
        .env("DISCLOSURE_CONFIG", &config)
        .args(["gov-verify", "R1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let record: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(record["govtReviewedBy"], "RegulatorMSP");
}
