//! Integration tests for the PEP CLI

use assert_cmd::Command;
use axum::{routing::post, Json, Router};
use predicates::prelude::*;
use serde_json::{json, Value};

fn pep() -> Command {
    Command::cargo_bin("pep").unwrap()
}

/// Start a PDP on a background runtime that answers every query with `verdict`
fn spawn_pdp(verdict: &'static str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new().route(
                "/v1/is_authorized",
                post(move || async move { Json(json!({ "decision": verdict })) }),
            );
            axum::serve(listener, app).await.unwrap();
        });
    });

    url
}

/// Test the version command
#[test]
fn test_cli_version() {
    pep()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pep"));
}

/// Test the help command
#[test]
fn test_cli_help() {
    pep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("policy decision point"))
        .stdout(predicate::str::contains("query"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_query_defaults() {
    pep()
        .arg("query")
        .arg("--user")
        .arg("alice")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""principal": "User::\"alice\"""#))
        .stdout(predicate::str::contains(r#""action": "Action::\"get\"""#))
        .stdout(predicate::str::contains(r#""resource": "ResourceType::\"article\"""#))
        .stdout(predicate::str::contains(r#""context": null"#));
}

#[test]
fn test_query_with_context() {
    pep()
        .args(["query", "--method", "POST", "--path", "/article/42"])
        .args(["--context", r#"{"title":"Hello"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""principal": "User::\"\"""#))
        .stdout(predicate::str::contains(r#""action": "Action::\"post\"""#))
        .stdout(predicate::str::contains(r#""title": "Hello""#));
}

#[test]
fn test_query_invalid_context() {
    pep()
        .args(["query", "--context", "{not json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--context is not valid JSON"));
}

#[test]
fn test_check_unreachable_pdp() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    pep()
        .args(["check", "--user", "alice", "--pdp-url", &url, "--timeout-ms", "500"])
        .env_remove("PEP_CONFIG")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PDP call"));
}

#[test]
fn test_check_allowed_exits_zero() {
    let url = spawn_pdp("Allow");

    pep()
        .args(["check", "--user", "alice", "--pdp-url", &url])
        .env_remove("PEP_CONFIG")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("ALLOWED"))
        .stdout(predicate::str::contains(r#"User::"alice""#));
}

#[test]
fn test_check_denied_exits_one() {
    let url = spawn_pdp("Deny");

    pep()
        .args(["check", "--user", "bob", "--method", "POST", "--path", "/article/42"])
        .args(["--pdp-url", &url])
        .env_remove("PEP_CONFIG")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("DENIED"));
}

#[test]
fn test_check_json_output() {
    let url = spawn_pdp("Allow");

    let output = pep()
        .args(["check", "--user", "alice", "--format", "json", "--pdp-url", &url])
        .env_remove("PEP_CONFIG")
        .assert()
        .code(0)
        .get_output()
        .stdout
        .clone();

    let body: Value = serde_json::from_slice(&output).expect("stdout is not JSON");
    assert_eq!(body["decision"], "Allow");
    assert_eq!(body["query"]["principal"], r#"User::"alice""#);
    assert_eq!(body["query"]["action"], r#"Action::"get""#);
    assert_eq!(body["query"]["resource"], r#"ResourceType::"article""#);
    assert!(body["latencyMs"].is_number());
}
