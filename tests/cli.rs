//! Command line tests for the connstat binary
//!
//! Successful runs target a local mock server, so no outside network access
//! is needed.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use regex::Regex;
use std::fs;
use std::process::Command;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const ENV_KEYS: &[&str] = &[
    "CONNSTAT_COUNT",
    "CONNSTAT_URL",
    "CONNSTAT_TRACE_DIR",
    "CONNSTAT_HEADER_POLICY",
    "CONNSTAT_TIMEOUT",
];

/// Command isolated from the caller's environment and `.env` files
fn connstat(work_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("connstat").unwrap();
    cmd.current_dir(work_dir.path());
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

struct TestServer {
    runtime: Runtime,
    server: MockServer,
}

impl TestServer {
    fn start() -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { runtime, server }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn url(&self, request_path: &str) -> String {
        format!("{}{}", self.server.uri(), request_path)
    }

    fn request_count(&self) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

fn report_pattern(status: u16) -> Regex {
    Regex::new(&format!(
        r"^SKTEST;127\.0\.0\.1;{};\d+\.\d{{6}};\d+\.\d{{6}};\d+\.\d{{6}};\d+\.\d{{6}}\n$",
        status
    ))
    .unwrap()
}

#[test]
fn test_help_lists_options() {
    let dir = TempDir::new().unwrap();
    connstat(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--count"))
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--header"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    connstat(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_successful_run_prints_report_line() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong")),
    );

    let dir = TempDir::new().unwrap();
    let output = connstat(&dir)
        .args(["-n", "3", "-u", &server.url("/probe")])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(report_pattern(200).is_match(&stdout), "unexpected stdout: {}", stdout);
    assert_eq!(server.request_count(), 3);
}

#[test]
fn test_headers_are_sent() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/auth"))
            .and(header("x-token", "abc"))
            .respond_with(ResponseTemplate::new(202)),
    );

    let dir = TempDir::new().unwrap();
    connstat(&dir)
        .args(["-u", &server.url("/auth"), "-H", "X-Token: abc"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^SKTEST;127\.0\.0\.1;202;").unwrap());
}

#[test]
fn test_json_format() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200)),
    );

    let dir = TempDir::new().unwrap();
    let output = connstat(&dir)
        .args(["-u", &server.url("/json"), "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["resolved_ip"], "127.0.0.1");
    assert_eq!(report["status_code"], 200);
}

#[test]
fn test_trace_directory_is_written() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/trace"))
            .respond_with(ResponseTemplate::new(200).set_body_string("traced body")),
    );

    let dir = TempDir::new().unwrap();
    let trace_dir = dir.path().join("out");
    connstat(&dir)
        .args(["-n", "2", "-u", &server.url("/trace")])
        .arg("--trace-dir")
        .arg(&trace_dir)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(trace_dir.join("body.bin")).unwrap(),
        "traced bodytraced body"
    );
    let headers = fs::read_to_string(trace_dir.join("headers.log")).unwrap();
    assert!(headers.contains("GET /trace HTTP/1.1"));
    assert!(fs::metadata(trace_dir.join("trace.log")).unwrap().len() > 0);
}

#[test]
fn test_zero_count_rejected() {
    let dir = TempDir::new().unwrap();
    connstat(&dir)
        .args(["-n", "0"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid request count"));
}

#[test]
fn test_count_from_environment() {
    let dir = TempDir::new().unwrap();
    connstat(&dir)
        .env("CONNSTAT_COUNT", "17")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid request count"));
}

#[test]
fn test_non_numeric_count_rejected() {
    let dir = TempDir::new().unwrap();
    connstat(&dir)
        .args(["-n", "-1"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_header_without_colon_rejected() {
    let dir = TempDir::new().unwrap();
    connstat(&dir)
        .args(["-H", "header_only"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid header"));
}

#[test]
fn test_overlong_url_rejected_at_parse_time() {
    let dir = TempDir::new().unwrap();
    let url = format!("http://{}.example/", "a".repeat(60));
    connstat(&dir)
        .args(["-u", &url])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("too long"));
}

#[test]
fn test_connection_refused_is_transport_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let dir = TempDir::new().unwrap();
    connstat(&dir)
        .args(["-u", &format!("http://127.0.0.1:{}/", port)])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Transport error"));
}
