use assert_cmd::Command;
use httpmock::prelude::*;

#[tokio::test]
async fn status_prints_counters() {
    let server = MockServer::start_async().await;
    let _m = server
        .mock_async(|when, then| {
            when.method(GET).path("/status");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"version":"0.1.0","timeout_ms":5000,"max_output_bytes":1048576,"commands":["ps -ef","df -h"],"uptime_s":42,"requests_total":7,"captures_ok":13,"capture_failures":1,"capture_timeouts":0,"render_errors":0}"#);
        })
        .await;

    Command::new(assert_cmd::cargo::cargo_bin!("hostsnap-cli"))
        .args(["--url", &server.base_url(), "status"])
        .assert()
        .success()
        .stdout(predicates::str::contains("uptime_s"))
        .stdout(predicates::str::contains("42"));
}
