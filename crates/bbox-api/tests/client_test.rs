#![allow(clippy::unwrap_used)]
// Integration tests for `BboxClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bbox_api::{BboxClient, Endpoint, Error, TransportConfig, WifiBand};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BboxClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BboxClient::new(base_url, &TransportConfig::default()).unwrap();
    (server, client)
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .and(body_string_contains("password=s3cret"))
        .and(body_string_contains("remember=1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "s3cret".to_string().into();
    client.login(&secret).await.unwrap();
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad password"))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login(&secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_unavailable_is_not_auth_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(503).set_body_string("rebooting"))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "s3cret".to_string().into();
    let err = client.login(&secret).await.unwrap_err();

    assert!(!err.is_auth_expired(), "got: {err:?}");
    assert!(matches!(err, Error::Api { status: 503, .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_session_cookie_is_replayed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "BBOX_ID=abc; Path=/"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .and(header_exists("cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"device": {}}])))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "s3cret".to_string().into();
    client.login(&secret).await.unwrap();
    client.fetch(Endpoint::BboxInfo).await.unwrap();
}

// ── Read tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_returns_raw_body() {
    let (server, client) = setup().await;

    let body = json!([
        {"hosts": {"list": [{"macaddress": "aa:bb:cc:dd:ee:ff", "active": 1}]}}
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v1/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let value = client.fetch(Endpoint::ConnectedDevices).await.unwrap();
    assert_eq!(value, body);
}

#[tokio::test]
async fn test_fetch_does_not_check_shape() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/wan/ip/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"not": "a list"})))
        .mount(&server)
        .await;

    let value = client.fetch(Endpoint::WanIpStats).await.unwrap();
    assert_eq!(value, json!({"not": "a list"}));
}

#[tokio::test]
async fn test_fetch_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device/mem"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.fetch(Endpoint::Memory).await;
    let err = result.unwrap_err();
    assert!(err.is_auth_expired(), "got: {err:?}");
}

#[tokio::test]
async fn test_fetch_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/wps"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let result = client.fetch(Endpoint::Wps).await;
    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "busy");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_invalid_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/speedtest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = client.fetch(Endpoint::Speedtest).await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "<html>"),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_fetch_invalid_body_preview_respects_char_boundaries() {
    let (server, client) = setup().await;

    // The two-byte 'é' straddles byte 200.
    let page = format!("<html>{}é</html>", "x".repeat(193));
    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page.clone()))
        .mount(&server)
        .await;

    let result = client.fetch(Endpoint::BboxInfo).await;
    match result {
        Err(Error::Deserialization { message, body }) => {
            assert_eq!(body, page);
            assert!(message.contains('é'), "preview cut mid-character: {message}");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Command tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_set_wireless() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/wireless/5"))
        .and(body_string_contains("radio.enable=0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.set_wireless(WifiBand::Band5, false).await.unwrap();
}

#[tokio::test]
async fn test_set_wps_start_and_stop() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/wps"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/wps"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.set_wps(true).await.unwrap();
    client.set_wps(false).await.unwrap();
}

#[tokio::test]
async fn test_set_device_parental_control() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/parentalcontrol/hosts"))
        .and(body_string_contains("macaddress=aa%3Abb%3Acc%3Add%3Aee%3Aff"))
        .and(body_string_contains("enable=1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_device_parental_control("aa:bb:cc:dd:ee:ff", true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reboot_uses_device_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"device": {"token": "tok42"}}])),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/device/reboot"))
        .and(query_param("btoken", "tok42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.reboot().await.unwrap();
}

#[tokio::test]
async fn test_reboot_without_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"device": {}}])))
        .mount(&server)
        .await;

    let result = client.reboot().await;
    assert!(
        matches!(result, Err(Error::UnexpectedResponse(_))),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_command_forbidden() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/parentalcontrol"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client.set_parental_control(true).await;
    assert!(matches!(result, Err(Error::Forbidden { .. })), "got: {result:?}");
}
