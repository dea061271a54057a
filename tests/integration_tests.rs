//! Integration tests using wiremock to simulate HTTP servers.

use apireq::{Client, Error, Request, SetMode};
use http::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(serde::ser::Error::custom("refuses to serialize"))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test]
async fn test_successful_get_request() {
    init_tracing();
    let mock_server = MockServer::start().await;

    let response_data = TestData {
        id: 1,
        name: "Test".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_data))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client.send(Request::new().with_path("/test")).await;

    assert!(response.err().is_none());
    assert!(response.is_success());
    assert_eq!(response.status().unwrap().as_u16(), 200);
    assert!(response.body_len() > 0);

    let data: TestData = response.scan().unwrap();
    assert_eq!(data, response_data);
}

#[tokio::test]
async fn test_configured_method_is_honored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/things"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&TestData {
            id: 7,
            name: "created".to_string(),
        }))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .send(
            Request::new()
                .with_method(Method::POST)
                .with_path("/things"),
        )
        .await;

    assert_eq!(response.status().unwrap().as_u16(), 201);
}

#[tokio::test]
async fn test_body_round_trip() {
    let mock_server = MockServer::start().await;

    let request_data = TestData {
        id: 0,
        name: "New".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/test"))
        .and(body_json(&request_data))
        .respond_with(ResponseTemplate::new(201).set_body_json(&TestData {
            id: 1,
            name: "New".to_string(),
        }))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .send(
            Request::new()
                .with_method(Method::POST)
                .with_path("/test")
                .with_body(&request_data),
        )
        .await;

    assert_eq!(response.status().unwrap().as_u16(), 201);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        "application/json"
    );
    let sent: TestData = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent, request_data);
}

#[tokio::test]
async fn test_header_overwrite_replaces_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .default_header("x-api-key", "default-key")
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .send(
            Request::new()
                .with_path("/test")
                .with_header("x-api-key", "per-request", SetMode::Overwrite),
        )
        .await;
    assert!(response.err().is_none());

    let requests = mock_server.received_requests().await.unwrap();
    let values: Vec<_> = requests[0].headers.get_all("x-api-key").iter().collect();
    assert_eq!(values, vec!["per-request"]);
}

#[tokio::test]
async fn test_header_append_preserves_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .default_header("x-api-key", "default-key")
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .send(
            Request::new()
                .with_path("/test")
                .with_header("x-api-key", "extra", SetMode::Append),
        )
        .await;
    assert!(response.err().is_none());

    let requests = mock_server.received_requests().await.unwrap();
    let values: Vec<_> = requests[0].headers.get_all("x-api-key").iter().collect();
    assert_eq!(values, vec!["default-key", "extra"]);
}

#[tokio::test]
async fn test_header_overwrite_then_overwrite_keeps_last() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .send(
            Request::new()
                .with_path("/test")
                .with_header("x-trace", "first", SetMode::Overwrite)
                .with_header("x-trace", "second", SetMode::Overwrite),
        )
        .await;
    assert!(response.err().is_none());

    let requests = mock_server.received_requests().await.unwrap();
    let values: Vec<_> = requests[0].headers.get_all("x-trace").iter().collect();
    assert_eq!(values, vec!["second"]);

    // With Append on the second operation, both values go out.
    let response = client
        .send(
            Request::new()
                .with_path("/test")
                .with_header("x-trace", "first", SetMode::Overwrite)
                .with_header("x-trace", "second", SetMode::Append),
        )
        .await;
    assert!(response.err().is_none());

    let requests = mock_server.received_requests().await.unwrap();
    let values: Vec<_> = requests[1].headers.get_all("x-trace").iter().collect();
    assert_eq!(values, vec!["first", "second"]);
}

#[tokio::test]
async fn test_query_param_overwrite_and_append() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .send(
            Request::new()
                .with_path("/test")
                .with_query_param("a", "1", SetMode::Overwrite)
                .with_query_param("a", "2", SetMode::Overwrite),
        )
        .await;
    assert!(response.err().is_none());

    let response = client
        .send(
            Request::new()
                .with_path("/test")
                .with_query_param("a", "1", SetMode::Overwrite)
                .with_query_param("a", "2", SetMode::Append),
        )
        .await;
    assert!(response.err().is_none());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("a=2"));
    assert_eq!(requests[1].url.query(), Some("a=1&a=2"));
}

#[tokio::test]
async fn test_encode_failure_makes_no_network_call() {
    let mock_server = MockServer::start().await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .send(Request::new().with_path("/test").with_body(&Unserializable))
        .await;

    let err = response.err().expect("expected a build error");
    assert!(matches!(
        err,
        Error::InvalidRequest(causes)
            if causes.len() == 1 && matches!(causes[0], Error::BodyEncode(_))
    ));
    assert_eq!(response.status(), None);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_multiple_build_errors_aggregate() {
    let mock_server = MockServer::start().await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .send(
            Request::new()
                .with_body(&Unserializable)
                .with_header("bad header", "x", SetMode::Overwrite),
        )
        .await;

    let err = response.err().expect("expected a build error");
    assert_eq!(err.causes().len(), 2);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_scan_on_error_status_with_json_body() {
    init_tracing();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"msg": "not found"})),
        )
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client.send(Request::new().with_path("/missing")).await;

    #[derive(Deserialize)]
    struct ErrorBody {
        msg: String,
    }

    assert!(response.err().is_none());
    assert_eq!(response.status().unwrap().as_u16(), 404);
    assert!(!response.is_success());

    let body: ErrorBody = response.scan().unwrap();
    assert_eq!(body.msg, "not found");
}

#[tokio::test]
async fn test_transport_failure() {
    // Bind a listener to reserve a port, then drop it so connections are
    // refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = Client::builder()
        .base_url(format!("http://127.0.0.1:{port}"))
        .unwrap()
        .build()
        .unwrap();

    let response = client.send(Request::new().with_path("/test")).await;

    assert!(matches!(response.err(), Some(Error::Network(_))));
    assert_eq!(response.status(), None);
    assert_eq!(response.body_len(), 0);

    // Scan surfaces the same stored error without trying to parse a body.
    let err = response.scan::<TestData>().unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn test_decode_error_on_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();

    let response = client.send(Request::new().with_path("/test")).await;
    assert!(response.err().is_none());

    let err = response.scan::<TestData>().unwrap_err();
    assert!(matches!(
        err,
        Error::Decode { status, .. } if status.as_u16() == 200
    ));
}

#[tokio::test]
async fn test_timeout_surfaces_as_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let response = client.send(Request::new().with_path("/slow")).await;

    assert!(matches!(response.err(), Some(Error::Network(_))));
}

#[tokio::test]
async fn test_path_joins_onto_base_url_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/api/v1", mock_server.uri()))
        .unwrap()
        .build()
        .unwrap();

    let response = client.send(Request::new().with_path("/users")).await;

    assert_eq!(response.status().unwrap().as_u16(), 200);
    let users: Vec<TestData> = response.scan().unwrap();
    assert!(users.is_empty());
}
