//! Integration tests for the `billdeck` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a backend; the end-to-end cases talk to a wiremock CRM.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `billdeck` binary with env isolation.
///
/// Clears all `BILLDECK_*` env vars and points config and data
/// directories at `home` so tests never touch real configuration.
fn billdeck_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("billdeck");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG")
        .env_remove("BILLDECK_PROFILE")
        .env_remove("BILLDECK_SERVER")
        .env_remove("BILLDECK_TOKEN")
        .env_remove("BILLDECK_OUTPUT")
        .env_remove("BILLDECK_INSECURE")
        .env_remove("BILLDECK_TIMEOUT")
        .env_remove("BILLDECK_CACHE_PATH");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a prepared command off the async runtime so wiremock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn site_json() -> serde_json::Value {
    json!({
        "site_code": "EDSA-001",
        "name": "EDSA Guadalupe",
        "area": "Makati",
        "landmarks": ["Guadalupe Bridge"],
        "latitude": 14.5667,
        "longitude": 121.0453,
        "price": 250000,
        "owner": "Acme Outdoor"
    })
}

fn booking_json() -> serde_json::Value {
    json!({
        "id": 11,
        "site_code": "EDSA-001",
        "client": "Globe Telecom",
        "account_executives": ["Ana"],
        "start_date": "2026-01-01",
        "end_date": "2099-12-31",
        "monthly_rate": 240000,
        "status": "ONGOING"
    })
}

async fn crm() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [site_json()] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [booking_json()] })))
        .mount(&server)
        .await;
    server
}

/// An address nothing listens on.
fn dead_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

fn remote_args<'a>(server: &'a str, cache: &'a Path) -> Vec<&'a str> {
    vec![
        "--server",
        server,
        "--token",
        "test-token",
        "--cache-path",
        cache.to_str().unwrap(),
    ]
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = billdeck_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    billdeck_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Billboard sales")
            .and(predicate::str::contains("sites"))
            .and(predicate::str::contains("bookings"))
            .and(predicate::str::contains("deck")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    billdeck_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("billdeck"));
}

#[test]
fn test_subcommand_help_lists_actions() {
    let home = tempfile::tempdir().unwrap();
    billdeck_cmd(home.path())
        .args(["deck", "build", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--adjust")
                .and(predicate::str::contains("--duration"))
                .and(predicate::str::contains("--currency")),
        );
    billdeck_cmd(home.path())
        .args(["cache", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sync").and(predicate::str::contains("purge")));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    billdeck_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    billdeck_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = billdeck_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_sites_list_without_config() {
    let home = tempfile::tempdir().unwrap();
    let output = billdeck_cmd(home.path()).args(["sites", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("config"), "Expected config hint:\n{text}");
}

#[test]
fn test_unknown_profile_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = billdeck_cmd(home.path())
        .args(["--profile", "nope", "sites", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_missing_token_exits_with_auth_code() {
    let home = tempfile::tempdir().unwrap();
    let output = billdeck_cmd(home.path())
        .args(["--server", "https://crm.example.com/api", "bookings", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_config_show_no_config() {
    let home = tempfile::tempdir().unwrap();
    billdeck_cmd(home.path()).args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_then_show() {
    let home = tempfile::tempdir().unwrap();
    billdeck_cmd(home.path())
        .args(["config", "set", "server", "https://crm.example.com/api"])
        .assert()
        .success();
    billdeck_cmd(home.path())
        .args(["config", "set", "currency", "usd"])
        .assert()
        .success();
    billdeck_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://crm.example.com/api")
                .and(predicate::str::contains("currency = \"USD\"")),
        );
}

#[test]
fn test_structured_config_show_masks_plaintext_token() {
    let home = tempfile::tempdir().unwrap();
    let located = billdeck_cmd(home.path())
        .args(["config", "show", "--output", "plain"])
        .output()
        .unwrap();
    let config_path = std::path::PathBuf::from(String::from_utf8(located.stdout).unwrap().trim());
    std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    std::fs::write(
        &config_path,
        "[profiles.default]\nserver = \"https://crm.example.com/api\"\ntoken = \"plaintext-secret\"\n",
    )
    .unwrap();

    for format in ["json", "yaml"] {
        billdeck_cmd(home.path())
            .args(["config", "show", "--output", format])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("****")
                    .and(predicate::str::contains("https://crm.example.com/api"))
                    .and(predicate::str::contains("plaintext-secret").not()),
            );
    }
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = billdeck_cmd(home.path())
        .args(["--output", "invalid", "sites", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about invalid output format:\n{text}"
    );
}

#[test]
fn test_bad_adjustment_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let output = billdeck_cmd(home.path())
        .args([
            "--server",
            "https://crm.example.com/api",
            "--token",
            "t",
            "deck",
            "build",
            "--title",
            "Q1",
            "--adjust",
            "ten percent",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("adjust"));
}

#[test]
fn test_cache_status_works_without_a_session() {
    let home = tempfile::tempdir().unwrap();
    let cache = home.path().join("cache.redb");
    billdeck_cmd(home.path())
        .args([
            "--server",
            "https://crm.example.com/api",
            "--cache-path",
            cache.to_str().unwrap(),
            "-o",
            "json",
            "cache",
            "status",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"images\": 0"));
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_list_json() {
    let server = crm().await;
    let home = tempfile::tempdir().unwrap();
    let uri = format!("{}/api", server.uri());
    let cache = home.path().join("cache.redb");

    let mut cmd = billdeck_cmd(home.path());
    cmd.args(remote_args(&uri, &cache))
        .args(["-o", "json", "sites", "list", "--area", "makati"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let sites: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(sites[0]["code"], "EDSA-001");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deck_build_prices_the_selection() {
    let server = crm().await;
    let home = tempfile::tempdir().unwrap();
    let uri = format!("{}/api", server.uri());
    let cache = home.path().join("cache.redb");

    let mut cmd = billdeck_cmd(home.path());
    cmd.args(remote_args(&uri, &cache)).args([
        "-o",
        "json",
        "deck",
        "build",
        "--title",
        "Q1 proposal",
        "--site",
        "edsa-001",
        "--adjust",
        "+10%",
        "--duration",
        "3",
    ]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let deck: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let slide = &deck["slides"][0];
    assert_eq!(slide["site"]["code"], "EDSA-001");
    let adjusted = slide["adjusted_price"].as_f64().unwrap();
    assert!((adjusted - 275_000.0).abs() < 1e-6, "adjusted price {adjusted}");
    assert_eq!(slide["rates"][0]["months"], 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bookings_fall_back_to_offline_copy() {
    let server = crm().await;
    let home = tempfile::tempdir().unwrap();
    let uri = format!("{}/api", server.uri());
    let cache = home.path().join("cache.redb");

    let mut online = billdeck_cmd(home.path());
    online
        .args(remote_args(&uri, &cache))
        .args(["-o", "json", "bookings", "list"]);
    let output = run(online).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let dead = dead_server();
    let mut offline = billdeck_cmd(home.path());
    offline
        .args(remote_args(&dead, &cache))
        .args(["--timeout", "2", "-o", "json", "bookings", "list"]);
    let output = run(offline).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let bookings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(bookings[0]["client"], "Globe Telecom");
    assert!(String::from_utf8_lossy(&output.stderr).contains("offline copy"));
}
