//! Binary smoke tests
//!
//! Runs the `pantrypal` binary with temporary configs and data directories.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pantrypal() -> Command {
    let mut cmd = Command::cargo_bin("pantrypal").unwrap();
    for var in [
        "API_BASE",
        "PANTRYPAL_API_BASE",
        "PANTRYPAL_TIMEOUT_SECONDS",
        "PANTRYPAL_DATA_DIR",
        "PANTRYPAL_CREDENTIAL_BACKEND",
        "PANTRYPAL_PASSWORD",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_version_flag() {
    pantrypal()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pantrypal"));
}

#[test]
fn test_help_lists_commands() {
    pantrypal()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("chats"))
        .stdout(predicate::str::contains("request"));
}

#[test]
fn test_invalid_config_timeout_zero() {
    let (_temp_dir, config_path) = common::temp_config_file(
        r#"
api:
  timeout_seconds: 0
"#,
    );

    pantrypal()
        .arg("--config")
        .arg(config_path)
        .arg("logout")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "api.timeout_seconds must be greater than 0",
        ));
}

#[test]
fn test_invalid_base_url_from_flag() {
    pantrypal()
        .args(["--config", "/nonexistent/config.yaml"])
        .args(["--api-base", "ftp://example.com"])
        .arg("logout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_chats_list_json_against_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "abc", "title": "Pesto", "updatedAt": "2024-01-01T00:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let data_dir = TempDir::new().unwrap();
    let (_config_dir, config_path) = common::temp_config_file(
        r#"
storage:
  credential_backend: memory
"#,
    );

    let uri = server.uri();
    let data = data_dir.path().to_path_buf();
    tokio::task::spawn_blocking(move || {
        pantrypal()
            .arg("--config")
            .arg(config_path)
            .arg("--api-base")
            .arg(&uri)
            .arg("--data-dir")
            .arg(data)
            .args(["chats", "list", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"id\": \"abc\""))
            .stdout(predicate::str::contains("\"title\": \"Pesto\""));
    })
    .await
    .unwrap();
}

#[test]
fn test_chats_show_unknown_offline_fails() {
    let data_dir = TempDir::new().unwrap();
    let (_config_dir, config_path) = common::temp_config_file(
        r#"
api:
  base_url: http://127.0.0.1:9
  timeout_seconds: 2
storage:
  credential_backend: memory
"#,
    );

    pantrypal()
        .arg("--config")
        .arg(config_path)
        .arg("--data-dir")
        .arg(data_dir.path())
        .args(["chats", "show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown chat: missing"));
}
