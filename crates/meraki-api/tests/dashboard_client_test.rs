// Integration tests for `DashboardClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use meraki_api::{DashboardClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let client = DashboardClient::new(
        &format!("{}/api/v1", server.uri()),
        &SecretString::from("test-key".to_owned()),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_networks_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/123/networks"))
        .and(header("authorization", "Bearer test-key"))
        .and(query_param("perPage", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "N_1", "name": "HQ", "organizationId": "123", "productTypes": ["appliance"] },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let networks = client.organization_networks("123").await.unwrap();

    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].id, "N_1");
    assert_eq!(networks[0].name, "HQ");
    assert_eq!(networks[0].product_types, vec!["appliance".to_owned()]);
}

#[tokio::test]
async fn test_networks_follow_link_header_pages() {
    let (server, client) = setup().await;

    let next = format!(
        "<{}/api/v1/organizations/123/networks?perPage=1000&startingAfter=N_1>; rel=next",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/123/networks"))
        .and(query_param("startingAfter", "N_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "N_2", "name": "Branch" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/123/networks"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next.as_str())
                .set_body_json(json!([{ "id": "N_1", "name": "HQ" }])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let networks = client.organization_networks("123").await.unwrap();
    let names: Vec<_> = networks.iter().map(|n| n.name.as_str()).collect();

    assert_eq!(names, vec!["HQ", "Branch"]);
}

#[tokio::test]
async fn test_link_cycle_stops_pagination() {
    let (server, client) = setup().await;

    let first = format!("{}/api/v1/organizations/123/networks?perPage=1000", server.uri());
    let second = format!("{first}&startingAfter=N_1");

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/123/networks"))
        .and(query_param("startingAfter", "N_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{first}>; rel=next").as_str())
                .set_body_json(json!([{ "id": "N_2", "name": "Branch" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/123/networks"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{second}>; rel=next").as_str())
                .set_body_json(json!([{ "id": "N_1", "name": "HQ" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let networks = client.organization_networks("123").await.unwrap();
    let ids: Vec<_> = networks.iter().map(|n| n.id.as_str()).collect();

    assert_eq!(ids, vec!["N_1", "N_2"]);
}

#[tokio::test]
async fn test_network_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/N_1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "mac": "A1", "name": "r1", "model": "MX64", "lanIp": "10.0.0.1", "serial": "Q2-1" },
            { "mac": "A2", "model": "MR33" },
        ])))
        .mount(&server)
        .await;

    let devices = client.network_devices("N_1").await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].display_name(), Some("r1"));
    assert_eq!(devices[0].management_address(), Some("10.0.0.1"));
    assert_eq!(devices[1].display_name(), None);
    assert_eq!(devices[1].management_address(), None);
}

#[tokio::test]
async fn test_follows_shard_redirect() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/N_1/devices"))
        .respond_with(ResponseTemplate::new(308).insert_header(
            "Location",
            format!("{}/shard/api/v1/networks/N_1/devices", server.uri()).as_str(),
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shard/api/v1/networks/N_1/devices"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "mac": "A1", "model": "MS120-8", "lanIp": "10.0.0.9" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.network_devices("N_1").await.unwrap();
    assert_eq!(devices[0].mac, "A1");
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/123/networks"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "errors": ["Invalid API key"] })),
        )
        .mount(&server)
        .await;

    let err = client.organization_networks("123").await.unwrap_err();
    assert!(matches!(err, Error::InvalidApiKey), "got {err:?}");
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_rate_limited_reports_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/N_1/devices"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = client.network_devices("N_1").await.unwrap_err();
    assert!(
        matches!(err, Error::RateLimited { retry_after_secs: 7 }),
        "got {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_api_error_joins_messages() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/N_1/devices"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": ["first problem", "second problem"]
        })))
        .mount(&server)
        .await;

    let err = client.network_devices("N_1").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Dashboard API error (HTTP 400): first problem; second problem"
    );
}

#[tokio::test]
async fn test_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/N_404/devices"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.network_devices("N_404").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/N_1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
        .mount(&server)
        .await;

    let err = client.network_devices("N_1").await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("not")),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/N_1/devices"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "/api/v1/networks/N_1/devices"),
        )
        .mount(&server)
        .await;

    let err = client.network_devices("N_1").await.unwrap_err();
    assert!(matches!(err, Error::TooManyRedirects { limit: 5, .. }), "got {err:?}");
}
