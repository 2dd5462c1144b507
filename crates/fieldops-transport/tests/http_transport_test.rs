//! Integration tests for HTTP transport

use fieldops_core::{Error, ErrorKind};
use fieldops_transport::{
    HttpRequest, HttpTransport, HttpTransportConfig, Transport, TransportError,
};
use http::header::{HeaderName, HeaderValue};
use http::{Method, StatusCode};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn url(server: &MockServer, rest: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), rest)).unwrap()
}

#[tokio::test]
async fn test_get_returns_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/jobs/42"))
        .and(query_param("expand", "site"))
        .and(header("x-api-key", "secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "req-1")
                .set_body_string(r#"{"id":42}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let request = HttpRequest::new(Method::GET, url(&server, "/v2/jobs/42?expand=site"))
        .with_header(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("secret"),
        );

    let response = transport.send(request).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-request-id"), Some("req-1"));
    assert_eq!(&response.body[..], br#"{"id":42}"#);
}

#[tokio::test]
async fn test_error_status_is_not_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/jobs"))
        .and(body_string("payload"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "2"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send(HttpRequest::new(Method::POST, url(&server, "/v2/jobs")).with_body("payload"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!response.is_success());
    assert_eq!(response.header("retry-after"), Some("2"));
}

#[tokio::test]
async fn test_request_timeout_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let error = transport
        .send(
            HttpRequest::new(Method::GET, url(&server, "/slow"))
                .with_timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();

    assert!(error.is_timeout(), "got {error:?}");
    let classified: Error = error.into();
    assert_eq!(classified.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_refused_connection_maps_to_transport_kind() {
    // bind then drop a listener so the port is very likely closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let transport = HttpTransport::with_config(HttpTransportConfig {
        connect_timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .unwrap();

    let target = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
    let error = transport
        .send(HttpRequest::new(Method::GET, target))
        .await
        .unwrap_err();

    assert!(matches!(error, TransportError::Connection(_)), "got {error:?}");
    let classified: Error = error.into();
    assert_eq!(classified.kind(), ErrorKind::Transport);
}
