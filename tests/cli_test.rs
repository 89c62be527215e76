//! Binary smoke tests

mod common;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{session_json, temp_config_file};

fn ragchat() -> Command {
    let mut cmd = Command::cargo_bin("ragchat").unwrap();
    for var in [
        "RAGCHAT_BASE_URL",
        "RAGCHAT_TIMEOUT_SECONDS",
        "RAGCHAT_MODE",
        "RAGCHAT_ROLE",
        "RAGCHAT_NAMESPACE",
        "RAGCHAT_TOP_K",
        "RAGCHAT_DEBUG",
        "RAGCHAT_REVEAL_INTERVAL_MS",
    ] {
        cmd.env_remove(var);
    }
    cmd.args(["--config", "/nonexistent/ragchat.yaml"]);
    cmd
}

#[test]
fn test_help_lists_commands() {
    ragchat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("ingest"));
}

#[test]
fn test_version() {
    ragchat()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_server_scheme_fails_validation() {
    ragchat()
        .args(["--server", "ftp://example.com", "sessions", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must use http or https"));
}

#[test]
fn test_invalid_config_file_fails() {
    let (_dir, path) = temp_config_file("chat:\n  top_k: 0\n");
    Command::cargo_bin("ragchat")
        .unwrap()
        .args(["--config", path.to_str().unwrap(), "sessions", "list"])
        .env_remove("RAGCHAT_TOP_K")
        .assert()
        .failure()
        .stderr(predicate::str::contains("chat.top_k"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sessions_list_prints_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [session_json("abc123", "Quarterly planning", 6)]
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        ragchat()
            .args(["--server", uri.as_str(), "sessions", "list"])
            .output()
    })
    .await
    .unwrap()
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("abc123"))
        .stdout(predicate::str::contains("Quarterly planning"))
        .stdout(predicate::str::contains("6 messages"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ingest_requires_content_locally() {
    let server = MockServer::start().await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        ragchat()
            .args(["--server", uri.as_str(), "ingest", "--title", "t", "--content", "   "])
            .output()
    })
    .await
    .unwrap()
    .unwrap();

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a title and content"));
    assert!(server.received_requests().await.unwrap().is_empty());
}
