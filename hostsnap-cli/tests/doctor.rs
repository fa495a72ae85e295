use assert_cmd::Command;
use httpmock::prelude::*;

#[tokio::test]
async fn doctor_command_checks_health() {
    let server = MockServer::start_async().await;

    let _health = server
        .mock_async(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"ok","version":"0.1.0"}"#);
        })
        .await;

    let _status = server
        .mock_async(|when, then| {
            when.method(GET).path("/status");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{
                    "version": "0.1.0",
                    "timeout_ms": 5000,
                    "max_output_bytes": 1048576,
                    "commands": ["ps -ef", "df -h"],
                    "uptime_s": 3600,
                    "requests_total": 12,
                    "captures_ok": 23,
                    "capture_failures": 0,
                    "capture_timeouts": 1,
                    "render_errors": 0
                }"#);
        })
        .await;

    Command::new(assert_cmd::cargo::cargo_bin!("hostsnap-cli"))
        .args(["--url", &server.base_url(), "--no-color", "doctor"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Hostsnap Doctor"))
        .stdout(predicates::str::contains("ps -ef, df -h"))
        .stdout(predicates::str::contains("Daemon is healthy"));
}

#[tokio::test]
async fn doctor_command_handles_unreachable_server() {
    // Doctor still exits successfully but reports FAIL
    Command::new(assert_cmd::cargo::cargo_bin!("hostsnap-cli"))
        .args(["--url", "http://127.0.0.1:59999", "doctor"])
        .assert()
        .success()
        .stdout(predicates::str::contains("FAIL"));
}

#[tokio::test]
async fn doctor_command_reports_status_errors() {
    let server = MockServer::start_async().await;

    let _health = server
        .mock_async(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"ok","version":"0.1.0"}"#);
        })
        .await;

    let _status = server
        .mock_async(|when, then| {
            when.method(GET).path("/status");
            then.status(500).body("internal error");
        })
        .await;

    Command::new(assert_cmd::cargo::cargo_bin!("hostsnap-cli"))
        .args(["--url", &server.base_url(), "--no-color", "doctor"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Daemon Status:       FAIL"))
        .stdout(predicates::str::contains("500"));
}

#[tokio::test]
async fn doctor_command_reports_malformed_status() {
    let server = MockServer::start_async().await;

    let _health = server
        .mock_async(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"ok","version":"0.1.0"}"#);
        })
        .await;

    let _status = server
        .mock_async(|when, then| {
            when.method(GET).path("/status");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"version": "0.1.0"}"#);
        })
        .await;

    Command::new(assert_cmd::cargo::cargo_bin!("hostsnap-cli"))
        .args(["--url", &server.base_url(), "--no-color", "doctor"])
        .assert()
        .success()
        .stdout(predicates::str::contains("FAIL (Invalid JSON"));
}
