//! Integration tests for the `edgesync` CLI binary.
//!
//! Argument parsing, help, completions and error exit codes need no
//! network. The end-to-end cases run the binary against a wiremock FMC and
//! list source.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const DOMAIN: &str = "e276abec-e0f2-11e3-8169-6d9ed49b625f";
const OBJECT_ID: &str = "005056BB-0B24-0ed3-0000-000000000001";

/// Variables that would leak the developer's setup into a test.
const ISOLATED_ENV: &[&str] = &[
    "EDGESYNC_CONFIG",
    "EDGESYNC_OUTPUT",
    "EDGESYNC_LOG_FORMAT",
    "EDGESYNC_PASSWORD",
    "EDGESYNC_FMC__URL",
    "EDGESYNC_FMC__USERNAME",
    "EDGESYNC_FMC__PASSWORD",
    "EDGESYNC_SYNC__OBJECT_NAME",
    "EDGESYNC_SYNC__IPV4_URL",
    "EDGESYNC_SYNC__IPV6_URL",
    "EDGESYNC_SYNC__INCLUDE_IPV6",
    "EDGESYNC_SYNC__DRY_RUN",
    "WINGPY_FMC_BASE_URL",
    "WINGPY_FMC_USERNAME",
    "WINGPY_FMC_PASSWORD",
    "VERIFY_SSL",
    "FMC_DYNAMIC_NAME",
    "INCLUDE_IPV6",
    "DRY_RUN",
    "CHUNK_SIZE",
    "RUST_LOG",
    "NO_COLOR",
];

/// Build a [`Command`] for the `edgesync` binary with env isolation.
///
/// Points config directories at a nonexistent path so tests never touch
/// the user's real configuration.
fn edgesync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("edgesync");
    cmd.env("HOME", "/tmp/edgesync-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/edgesync-test-nonexistent");
    for name in ISOLATED_ENV {
        cmd.env_remove(name);
    }
    cmd
}

/// A command wired to a mock FMC and list source through env vars.
fn mocked_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = edgesync_cmd();
    cmd.env("EDGESYNC_FMC__URL", server.uri())
        .env("EDGESYNC_FMC__USERNAME", "api")
        .env("EDGESYNC_PASSWORD", "secret")
        .env("EDGESYNC_SYNC__IPV4_URL", format!("{}/ipv4", server.uri()));
    cmd
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_fmc(server: &MockServer, mappings: Value) {
    Mock::given(method("POST"))
        .and(path("/api/fmc_platform/v1/auth/generatetoken"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("X-auth-access-token", "token")
                .insert_header("DOMAIN_UUID", DOMAIN),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/api/fmc_config/v1/domain/{DOMAIN}/object/dynamicobjects"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": OBJECT_ID, "name": "BunnyCDN_Dynamic", "type": "DynamicObject" }],
            "paging": { "offset": 0, "limit": 1000, "count": 1, "pages": 1 }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/api/fmc_config/v1/domain/{DOMAIN}/object/dynamicobjects/{OBJECT_ID}/mappings"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(mappings))
        .mount(server)
        .await;
}

async fn mount_list(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/ipv4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn write_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("/object/dynamicobjectmappings"))
        .count()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = edgesync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    edgesync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("dynamic object")
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("mappings"))
            .and(predicate::str::contains("sources")),
    );
}

#[test]
fn test_version_flag() {
    edgesync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("edgesync"));
}

#[test]
fn test_invalid_subcommand() {
    edgesync_cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    edgesync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    edgesync_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    edgesync_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    edgesync_cmd()
        .args(["config", "path", "--config", "/tmp/elsewhere/edgesync.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere/edgesync.toml"));
}

#[test]
fn test_config_show_redacts_password() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(
        &file,
        "[fmc]\nurl = \"https://fmc.example.net\"\nusername = \"api\"\npassword = \"hunter2\"\n",
    )
    .unwrap();

    edgesync_cmd()
        .args(["config", "show", "--config"])
        .arg(&file)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://fmc.example.net")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_explicit_missing_config_is_usage_error() {
    let output = edgesync_cmd()
        .args(["sync", "--config", "/tmp/edgesync-test-nonexistent/none.toml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("not found"));
}

// ── Validation before network ───────────────────────────────────────

#[test]
fn test_sync_without_url_names_the_setting() {
    let output = edgesync_cmd().arg("sync").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("fmc.url"), "Expected 'fmc.url' in output:\n{text}");
}

#[test]
fn test_mappings_add_rejects_bad_address() {
    let output = edgesync_cmd()
        .args(["mappings", "add", "BunnyCDN_Dynamic", "10.0.0.1", "not-an-ip"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("not-an-ip"));
}

#[test]
fn test_mappings_add_requires_an_address() {
    edgesync_cmd()
        .args(["mappings", "add", "BunnyCDN_Dynamic"])
        .assert()
        .failure()
        .code(2);
}

// ── End to end against a mock FMC ───────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_sources_fetch_prints_canonical_addresses() {
    let server = MockServer::start().await;
    mount_list(&server, "[\"10.0.0.2\", \"10.0.0.1\", \"10.0.0.1/32\"]").await;

    let mut cmd = mocked_cmd(&server);
    cmd.args(["sources", "fetch", "-o", "plain"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "10.0.0.1/32\n10.0.0.2/32"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_sync_reports_delta_without_writes() {
    let server = MockServer::start().await;
    mount_list(&server, "10.0.0.1\n10.0.0.2\n").await;
    mount_fmc(&server, json!({ "mappings": ["10.0.0.1", "192.0.2.7"] })).await;

    let mut cmd = mocked_cmd(&server);
    cmd.args(["sync", "--dry-run", "-o", "json"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["object_id"], OBJECT_ID);
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["added"], 1);
    assert_eq!(report["removed"], 1);
    assert_eq!(write_count(&server).await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_list_exits_with_source_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipv4"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut cmd = mocked_cmd(&server);
    cmd.arg("sync");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.iter().all(|r| !r.url.path().contains("generatetoken")),
        "login must not happen when the desired set is unavailable"
    );
}
