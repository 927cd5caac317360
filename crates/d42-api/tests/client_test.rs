#![allow(clippy::unwrap_used)]
// Integration tests for `Device42Client` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use d42_api::{ApiResponse, ApiVersion, Credentials, Device42Client, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Device42Client) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = Device42Client::new(
        base_url,
        Credentials::new("admin", "secret".to_string()),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

fn cookie_header(request: &wiremock::Request) -> String {
    request
        .headers
        .get("cookie")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

// ── Headers ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_sends_basic_auth_and_accept() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/buildings/"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"buildings": []})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.get("buildings").await.unwrap();

    assert_eq!(resp, ApiResponse::Json(json!({"buildings": []})));
}

#[tokio::test]
async fn test_session_cookie_carried_forward() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/buildings/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=abc123; Path=/; HttpOnly")
                .set_body_json(json!({"buildings": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/rooms/"))
        .and(header("cookie", "sessionid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rooms": []})))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.session_cookie(), None);
    client.get("buildings").await.unwrap();
    assert_eq!(client.session_cookie().as_deref(), Some("sessionid=abc123"));

    let resp = client.get("rooms").await.unwrap();
    assert_eq!(resp, ApiResponse::Json(json!({"rooms": []})));
}

#[tokio::test]
async fn test_cookie_survives_responses_without_set_cookie() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/buildings/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=first; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/rooms/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    client.get("buildings").await.unwrap();
    client.get("rooms").await.unwrap();

    assert_eq!(client.session_cookie().as_deref(), Some("sessionid=first"));
}

#[tokio::test]
async fn test_cookies_from_separate_responses_accumulate() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/buildings/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "csrftoken=tok; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/rooms/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=abc; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/racks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    client.get("buildings").await.unwrap();
    client.get("rooms").await.unwrap();
    client.get("racks").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(cookie_header(&requests[1]), "csrftoken=tok");
    let last = cookie_header(&requests[2]);
    assert!(last.contains("csrftoken=tok"), "cookie header: {last}");
    assert!(last.contains("sessionid=abc"), "cookie header: {last}");

    let stored = client.session_cookie().unwrap();
    assert!(stored.contains("csrftoken=tok") && stored.contains("sessionid=abc"));
}

#[tokio::test]
async fn test_same_named_cookie_is_replaced() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/buildings/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=old; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/rooms/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=new; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    client.get("buildings").await.unwrap();
    client.get("rooms").await.unwrap();

    assert_eq!(client.session_cookie().as_deref(), Some("sessionid=new"));
}

// ── Paths ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_patch_panel_ports_path_has_no_trailing_slash() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/patch_panel_ports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.get("patch_panel_ports").await.unwrap();
}

#[tokio::test]
async fn test_patch_panel_ports_write_keeps_trailing_slash() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/patch_panel_ports/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": []})))
        .expect(1)
        .mount(&server)
        .await;

    let form = [("patch_panel_id", "3"), ("number", "1")];
    client
        .post(ApiVersion::V1, "patch_panel_ports", &form)
        .await
        .unwrap();
}

#[test]
fn test_url_for_versions() {
    let client = Device42Client::with_client(
        reqwest::Client::new(),
        Url::parse("https://d42.example.com:443").unwrap(),
        Credentials::new("admin", "secret".to_string()),
    );

    assert_eq!(
        client.url_for(ApiVersion::V1, "racks/80").unwrap().as_str(),
        "https://d42.example.com/api/1.0/racks/80/"
    );
    assert_eq!(
        client.url_for(ApiVersion::Unversioned, "device").unwrap().as_str(),
        "https://d42.example.com/api/device/"
    );
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_post_form_encoded_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/racks/"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("name=TestRack1&size=42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": ["rack added/updated.", 80, "TestRack1", true, true]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let form = vec![("name", "TestRack1"), ("size", "42")];
    let resp = client.post(ApiVersion::V1, "racks", &form).await.unwrap();

    let env = resp.envelope().unwrap();
    assert!(env.is_success());
    assert_eq!(env.assigned_id(), Some(&json!(80)));
}

#[tokio::test]
async fn test_put_unversioned() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/device/custom_field/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": ["custom key pair values added or updated", 1, "Device"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let form = vec![("name", "Device"), ("key", "used_since")];
    let resp = client
        .put(ApiVersion::Unversioned, "device/custom_field", &form)
        .await
        .unwrap();

    assert!(resp.is_success());
}

// ── Bodies ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_json_body_returned_as_text() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/ip/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("list index out of range"))
        .mount(&server)
        .await;

    let form = vec![("ipaddress", "127.0.0.1")];
    let resp = client.post(ApiVersion::Unversioned, "ip", &form).await.unwrap();

    assert_eq!(resp, ApiResponse::Text("list index out of range".into()));
}

#[tokio::test]
async fn test_failure_envelope_is_data_not_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/pdus/rack/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1,
            "msg": "Model PDU with pk '1' does not exist."
        })))
        .mount(&server)
        .await;

    let form = vec![("name", "Test PDU")];
    let resp = client.post(ApiVersion::V1, "pdus/rack/", &form).await.unwrap();

    let env = resp.envelope().unwrap();
    assert_eq!(env.code, 1);
    assert_eq!(env.assigned_id(), None);
}

// ── Transport failures ──────────────────────────────────────────────

#[tokio::test]
async fn test_connection_failure_propagates() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    drop(server);

    let client = Device42Client::with_client(
        reqwest::Client::new(),
        base_url,
        Credentials::new("admin", "secret".to_string()),
    );

    let result = client.get("buildings").await;

    match result {
        Err(ref err @ Error::Transport(_)) => assert!(err.is_connect()),
        other => panic!("expected Transport error, got: {other:?}"),
    }
}
