//! Integration tests for the `bsp` CLI binary.
//!
//! Argument parsing, offline commands (`parse`, `verify`), error exit codes,
//! and one provisioning run against a wiremock gateway.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `bsp` binary with env isolation.
///
/// Clears all `BSP_*` env vars, runs inside `dir` (so no stray
/// `./secret.json` is picked up), and points config directories at a
/// nonexistent path.
fn bsp_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("bsp");
    cmd.current_dir(dir)
        .env("HOME", "/tmp/bsp-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/bsp-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("BSP_PROFILE")
        .env_remove("BSP_SECRET_FILE")
        .env_remove("BSP_HOST")
        .env_remove("BSP_PORT")
        .env_remove("BSP_NO_TLS")
        .env_remove("BSP_INSECURE")
        .env_remove("BSP_TIMEOUT")
        .env_remove("BSP_OUTPUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn write_secret(dir: &Path, server: &MockServer) -> std::path::PathBuf {
    let addr = server.address();
    let path = dir.join("secret.json");
    write_json(
        &path,
        &json!({
            "default": {
                "host": addr.ip().to_string(),
                "port": addr.port(),
                "useTls": false,
                "appKey": "app",
                "secretKey": "secret",
                "sharedKey": "shared",
                "organization": "org"
            }
        }),
    );
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = bsp_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    bsp_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("provision")
            .and(predicate::str::contains("export"))
            .and(predicate::str::contains("parse"))
            .and(predicate::str::contains("verify"))
            .and(predicate::str::contains("transaction")),
    );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    bsp_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bsp"));
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    bsp_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_output_format() {
    let dir = tempfile::tempdir().unwrap();
    let output = bsp_cmd(dir.path())
        .args(["--output", "invalid", "verify"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Input errors ────────────────────────────────────────────────────

#[test]
fn test_provision_without_input_file() {
    let dir = tempfile::tempdir().unwrap();
    bsp_cmd(dir.path())
        .arg("provision")
        .assert()
        .code(9)
        .stderr(predicate::str::contains("provisioner-input.json"));
}

#[test]
fn test_provision_without_secret_file() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        &dir.path().join("input/provisioner-input.json"),
        &json!({ "sites": [{ "siteName": "Store 1" }] }),
    );
    bsp_cmd(dir.path())
        .args(["provision", "--secret-file", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_unknown_profile_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        &dir.path().join("secret.json"),
        &json!({ "default": {
            "host": "localhost", "appKey": "a", "secretKey": "s",
            "sharedKey": "k", "organization": "o"
        } }),
    );
    bsp_cmd(dir.path())
        .args(["--profile", "prod", "transaction", "get", "tx-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("prod"));
}

// ── parse ───────────────────────────────────────────────────────────

#[test]
fn test_parse_writes_input_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("sites.csv"),
        "siteName,enterpriseUnitName,status\nStore 1,East,ACTIVE\nStore 2,,INACTIVE\n",
    )
    .unwrap();

    bsp_cmd(dir.path())
        .args(["parse", "--csv", "sites.csv", "--out", "input.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 2 site(s)"));

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("input.json")).unwrap())
            .unwrap();
    assert_eq!(
        written,
        json!({ "sites": [
            { "siteName": "Store 1", "euName": "East", "status": "ACTIVE" },
            { "siteName": "Store 2", "status": "INACTIVE" }
        ] })
    );
}

#[test]
fn test_parse_rejects_row_without_site_name() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("sites.csv"), "siteName,userName\nok,u\n,u2\n").unwrap();

    bsp_cmd(dir.path())
        .args(["parse", "--csv", "sites.csv", "--out", "input.json"])
        .assert()
        .code(9)
        .stderr(predicate::str::contains("Line 3"));
    assert!(!dir.path().join("input.json").exists());
}

// ── verify ──────────────────────────────────────────────────────────

fn seed_verify_files(dir: &Path) {
    write_json(
        &dir.join("input/provisioner-input.json"),
        &json!({ "sites": [{ "siteName": "Store 1" }] }),
    );
    write_json(
        &dir.join("output/provisioner-output.json"),
        &json!({ "sites": { "store-1": {
            "siteId": "s1", "euName": "store-1", "euId": "e1",
            "userName": "store-1", "userNameCanonical": "store-1@org",
            "status": "ACTIVE"
        } } }),
    );
}

#[test]
fn test_verify_prints_table() {
    let dir = tempfile::tempdir().unwrap();
    seed_verify_files(dir.path());

    bsp_cmd(dir.path()).arg("verify").assert().success().stdout(
        predicate::str::contains("Sites Verified")
            .and(predicate::str::contains("Users Verified"))
            .and(predicate::str::contains("TRUE")),
    );
}

#[test]
fn test_verify_json_output() {
    let dir = tempfile::tempdir().unwrap();
    seed_verify_files(dir.path());

    let output = bsp_cmd(dir.path())
        .args(["--output", "json", "verify"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["sitesVerified"], true);
    assert_eq!(value["sitesCount"], 1);
    assert_eq!(value["usersCount"], 1);
}

#[test]
fn test_verify_missing_state_file() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        &dir.path().join("input/provisioner-input.json"),
        &json!({ "sites": [] }),
    );
    bsp_cmd(dir.path())
        .arg("verify")
        .assert()
        .code(9)
        .stderr(predicate::str::contains("provisioner-output.json"));
}

// ── Against a mock gateway ──────────────────────────────────────────

fn page(items: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "pageContent": items, "lastPage": true }))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_provision_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/security/groups"))
        .respond_with(page(json!([{ "groupName": "SiteControllerUsers" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/site/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "site-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/provisioning/enterprise-units"))
        .respond_with(page(json!([{ "enterpriseUnitId": "eu-1" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/provisioning/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "store-1" })))
        .mount(&server)
        .await;
    for route in ["/security/group-memberships", "/provisioning/enterprise-unit-grants"] {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/security/security-access-keys"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "sharedKey": "sh", "secretKey": "se" })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let secret = write_secret(dir.path(), &server);
    write_json(
        &dir.path().join("input/provisioner-input.json"),
        &json!({ "sites": [{ "siteName": "Store 1" }] }),
    );

    let root = dir.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        bsp_cmd(&root)
            .arg("--secret-file")
            .arg(&secret)
            .args(["--output", "json", "provision"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["siteName"], "store-1");
    assert_eq!(report[0]["keysIssued"], true);

    let key_file = dir.path().join("output/provisioner-keys/store-1.json");
    let key: Value = serde_json::from_str(&std::fs::read_to_string(key_file).unwrap()).unwrap();
    assert_eq!(key["sharedKey"], "sh");
    assert_eq!(key["siteId"], "site-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_transaction_exists_missing_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/transaction-document/transaction-documents/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let secret = write_secret(dir.path(), &server);
    let root = dir.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        bsp_cmd(&root)
            .arg("--secret-file")
            .arg(&secret)
            .args(["transaction", "exists", "nope"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}
