//! Integration tests for the `electrochlor` CLI binary.
//!
//! Argument parsing, help output, completions, config management, and
//! end-to-end runs against a wiremock device.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the binary with env isolation.
///
/// Clears all `ELECTROCHLOR_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn electrochlor_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("electrochlor");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("ELECTROCHLOR_DEVICE")
        .env_remove("ELECTROCHLOR_HOST")
        .env_remove("ELECTROCHLOR_PORT")
        .env_remove("ELECTROCHLOR_OUTPUT")
        .env_remove("ELECTROCHLOR_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_device(pump_on: bool) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/electrochlor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "temp": 27.456,
                "ph": 7.318,
                "saltStatus": "NORMAL",
                "status": { "pump": pump_on, "light": false, "cellDirectionA": true }
            }
        })))
        .mount(&server)
        .await;
    server
}

/// Run the binary against `server` off the async runtime.
async fn run_against(
    server: &MockServer,
    home: &Path,
    args: &[&str],
) -> std::process::Output {
    let addr = server.address();
    let mut cmd = electrochlor_cmd(home);
    cmd.args(["--host", &addr.ip().to_string(), "--port", &addr.port().to_string()])
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = electrochlor_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    electrochlor_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Electrochlor")
                .and(predicate::str::contains("status"))
                .and(predicate::str::contains("switch"))
                .and(predicate::str::contains("watch")),
        );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    electrochlor_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("electrochlor"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    electrochlor_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_switch_target() {
    let home = tempfile::tempdir().unwrap();
    let output = electrochlor_cmd(home.path())
        .args(["switch", "heater", "on"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("heater"));
}

#[test]
fn test_status_without_device() {
    let home = tempfile::tempdir().unwrap();
    let output = electrochlor_cmd(home.path()).arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No device configured"));
}

#[test]
fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    let output = electrochlor_cmd(home.path())
        .args(["--device", "spa", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("spa"));
}

// ── Config management ───────────────────────────────────────────────

#[test]
fn test_config_add_use_remove() {
    let home = tempfile::tempdir().unwrap();

    electrochlor_cmd(home.path())
        .args(["config", "add", "pool", "--host", "192.168.1.50"])
        .assert()
        .success();
    electrochlor_cmd(home.path())
        .args(["config", "add", "spa", "--host", "spa.local", "--port", "8090"])
        .assert()
        .success();

    electrochlor_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("default_device = \"pool\"")
                .and(predicate::str::contains("192.168.1.50"))
                .and(predicate::str::contains("port = 8090")),
        );

    electrochlor_cmd(home.path())
        .args(["config", "use", "spa"])
        .assert()
        .success();
    electrochlor_cmd(home.path())
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_device\": \"spa\""));

    electrochlor_cmd(home.path())
        .args(["config", "remove", "pool"])
        .assert()
        .success();
    electrochlor_cmd(home.path())
        .args(["-o", "plain", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pool").not());
}

#[test]
fn test_config_add_rejects_url_host() {
    let home = tempfile::tempdir().unwrap();
    electrochlor_cmd(home.path())
        .args(["config", "add", "pool", "--host", "http://pool.local/"])
        .assert()
        .code(2);
}

// ── Against a mock device ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_plain() {
    let server = mock_device(true).await;
    let home = tempfile::tempdir().unwrap();

    let output = run_against(&server, home.path(), &["-o", "plain", "status"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sensor.temp=27.5"), "{stdout}");
    assert!(stdout.contains("sensor.ph=7.32"), "{stdout}");
    assert!(stdout.contains("sensor.status=A"), "{stdout}");
    assert!(stdout.contains("binary_sensor.pump=on"), "{stdout}");
    assert!(stdout.contains("binary_sensor.saltStatus=off"), "{stdout}");
    assert!(stdout.contains("switch.light=off"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_shows_device_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/electrochlor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": true })))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let output = run_against(&server, home.path(), &["-o", "plain", "status"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sensor.error=Error"), "{stdout}");
    assert!(stdout.contains("binary_sensor.error=on"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_raw_json() {
    let server = mock_device(false).await;
    let home = tempfile::tempdir().unwrap();

    let output = run_against(&server, home.path(), &["-o", "json-compact", "raw"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["temp"], json!(27.456));
    assert_eq!(payload["status"]["pump"], json!(false));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_switch_confirmed() {
    let server = mock_device(true).await;
    Mock::given(method("POST"))
        .and(path("/electrochlor/state"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let output = run_against(&server, home.path(), &["switch", "pump", "on"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("confirmed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_switch_unconfirmed_exit_code() {
    let server = mock_device(false).await;
    Mock::given(method("POST"))
        .and(path("/electrochlor/state"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let output = run_against(
        &server,
        home.path(),
        &["switch", "pump", "on", "--verify-timeout", "1"],
    )
    .await;
    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("did not report on"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_device_exit_code() {
    let server = MockServer::builder().start().await;
    let addr = *server.address();
    drop(server);
    let home = tempfile::tempdir().unwrap();

    let mut cmd = electrochlor_cmd(home.path());
    cmd.args(["--host", &addr.ip().to_string(), "--port", &addr.port().to_string()])
        .arg("status");
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}
