#![allow(clippy::unwrap_used)]
// End-to-end refresh cycles against a mocked router over HTTP.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bbox_core::{Command, CommandResult, Coordinator, CoordinatorConfig, CoreError, validate};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> CoordinatorConfig {
    let mut config = CoordinatorConfig::new(
        server.address().to_string(),
        SecretString::from("s3cret".to_owned()),
    );
    config.use_tls = false;
    config.settle_delay = std::time::Duration::from_millis(10);
    config
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/{route}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn healthy_router() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "BBOX_ID=abc; Path=/"),
        )
        .mount(&server)
        .await;

    mount_get(
        &server,
        "device",
        json!([{"device": {"serialnumber": "SN42", "status": 1, "main": {"version": "23.7.8"}}}]),
    )
    .await;
    mount_get(
        &server,
        "hosts",
        json!([
            {"hosts": {"list": [{"macaddress": "AA:BB:CC:DD:EE:01", "active": 1, "hostname": "laptop"}]}},
            {"hosts": {"list": [{"macaddress": "AA:BB:CC:DD:EE:02", "active": 0}]}}
        ]),
    )
    .await;
    mount_get(
        &server,
        "wan/ip/stats",
        json!([{"wan": {"ip": {"stats": {"rx": {"bytes": 2048}, "tx": {"bytes": 1024}}}}}]),
    )
    .await;

    server
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_cycle_over_http() {
    let server = healthy_router().await;
    // Optional endpoint failing with a server error.
    Mock::given(method("GET"))
        .and(path("/api/v1/wireless"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let snapshot = Coordinator::oneshot(config_for(&server), |c| async move {
        c.snapshot().ok_or(CoreError::CoordinatorStopped)
    })
    .await
    .unwrap();

    assert_eq!(snapshot.cycle(), 1);
    assert_eq!(snapshot.get("info.device.main.version"), Some(&json!("23.7.8")));
    assert_eq!(snapshot.get("wan_ip_stats.wan.ip.stats.rx.bytes"), Some(&json!(2048)));
    assert_eq!(snapshot.domain("wifi"), Some(&serde_json::Map::new()));
    assert_eq!(snapshot.domain("leds"), Some(&serde_json::Map::new()));

    let macs: Vec<_> = snapshot.devices().into_iter().map(|d| d.mac).collect();
    assert_eq!(macs, vec!["AA:BB:CC:DD:EE:01", "AA:BB:CC:DD:EE:02"]);
}

#[tokio::test]
async fn test_critical_http_failure_fails_connect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    // /device is missing entirely.
    mount_get(&server, "hosts", json!([{"hosts": {"list": []}}])).await;
    mount_get(&server, "wan/ip/stats", json!([{"wan": {}}])).await;

    let result = Coordinator::oneshot(config_for(&server), |_c| async { Ok(()) }).await;
    assert!(matches!(result, Err(CoreError::Transport { .. })), "{result:?}");
}

#[tokio::test]
async fn test_rejected_password_is_auth_expired() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = validate(&config_for(&server)).await;
    assert!(result.is_err_and(|e| e.is_auth_expired()));
}

#[tokio::test]
async fn test_validate_reads_serial() {
    let server = healthy_router().await;
    let serial = validate(&config_for(&server)).await.unwrap();
    assert_eq!(serial, "SN42");
}

#[tokio::test]
async fn test_toggle_refreshes_over_http() {
    let server = healthy_router().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/parentalcontrol"))
        .and(body_string_contains("enable=1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = Coordinator::oneshot(config_for(&server), |c| async move {
        c.execute(Command::SetParentalControl { enable: true }).await
    })
    .await
    .unwrap();

    assert_eq!(result, CommandResult::Refreshed { cycle: 2 });
}
