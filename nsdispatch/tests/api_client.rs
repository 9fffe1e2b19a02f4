// HTTPS API client tests using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nsdispatch::api::{ApiSession, ApiTransport, CONFIG_ENDPOINTS};
use nsdispatch::error::ApiError;
use nsdispatch::{Device, HttpsApiTransport};

fn device() -> Device {
    Device::new("ns1", "192.0.2.10", "nsroot", "secret")
}

async fn setup() -> (MockServer, HttpsApiTransport) {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let transport = HttpsApiTransport::netscaler().with_base_url(base);
    (server, transport)
}

#[tokio::test]
async fn login_sends_credentials_and_yields_a_session() {
    let (server, transport) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": "nsroot", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = transport.connect(&device()).await;
    assert!(session.is_ok());
}

#[tokio::test]
async fn rejected_login_is_an_authentication_error() {
    let (server, transport) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = transport.connect(&device()).await.unwrap_err();
    assert_eq!(err.code(), Some("E1021"));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn endpoints_are_fetched_from_the_config_tree() {
    let (server, transport) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    for endpoint in CONFIG_ENDPOINTS {
        Mock::given(method("GET"))
            .and(path(format!("/config{endpoint}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "endpoint": endpoint }])),
            )
            .mount(&server)
            .await;
    }

    let mut session = transport.connect(&device()).await.unwrap();
    for endpoint in CONFIG_ENDPOINTS {
        let value = session.fetch_endpoint(endpoint).await.unwrap();
        assert_eq!(value, json!([{ "endpoint": endpoint }]));
    }
    session.disconnect().await;
}

#[tokio::test]
async fn endpoint_server_error_names_the_endpoint() {
    let (server, transport) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/config/ip/dns"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = transport.connect(&device()).await.unwrap();
    let err = session.fetch_endpoint("/ip/dns").await.unwrap_err();

    assert_eq!(err.code(), Some("E1022"));
    match err {
        ApiError::Endpoint { endpoint, reason } => {
            assert_eq!(endpoint, "/ip/dns");
            assert!(reason.contains("500"));
        }
        other => panic!("expected an endpoint error, got {other:?}"),
    }
    session.disconnect().await;
}

#[tokio::test]
async fn non_json_endpoint_body_is_an_endpoint_error() {
    let (server, transport) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/config/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let mut session = transport.connect(&device()).await.unwrap();
    let err = session.fetch_endpoint("/user").await.unwrap_err();

    assert_eq!(err.code(), Some("E1022"));
    session.disconnect().await;
}

#[tokio::test]
async fn disconnect_logs_out_of_the_device() {
    let (server, transport) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = transport.connect(&device()).await.unwrap();
    session.disconnect().await;
}

#[tokio::test]
async fn unavailable_transport_reports_no_capability() {
    let transport = HttpsApiTransport::unavailable();
    assert!(!transport.available());
}

#[tokio::test]
async fn unreachable_device_is_a_connect_error() {
    // Nothing listens on this port.
    let base = Url::parse("http://127.0.0.1:9").unwrap();
    let transport = HttpsApiTransport::netscaler().with_base_url(base);

    let err = transport.connect(&device()).await.unwrap_err();
    assert!(matches!(err, ApiError::Connect { .. }));
    assert_eq!(err.code(), None);
}
