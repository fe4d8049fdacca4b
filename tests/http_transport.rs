#![cfg(feature = "reqwest-transport")]

mod common;

use common::{closed_port, direct_transport, recv_within, start_mock_endpoint, Reply};
use http_log_sink::{Headers, SendError, Transport};
use url::Url;

fn endpoint(addr: std::net::SocketAddr) -> Url {
    Url::parse(&format!("http://{addr}/ingest")).unwrap()
}

#[tokio::test]
async fn posts_json_with_fixed_and_custom_headers() {
    let (addr, mut requests) = start_mock_endpoint(Reply::Status(200, "")).await;
    let headers = Headers::from([
        ("Authorization".to_string(), "Bearer secret".to_string()),
        ("Content-Type".to_string(), "text/plain".to_string()),
    ]);

    let result = direct_transport()
        .send(br#"{"message":"hi"}"#.to_vec(), &endpoint(addr), &headers)
        .await;
    assert!(result.is_ok(), "unexpected result: {result:?}");

    let request = recv_within(&mut requests, 5).await;
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/ingest");
    assert_eq!(request.header("content-type"), vec!["application/json"]);
    assert_eq!(request.header("accept"), vec!["application/json"]);
    assert_eq!(request.header("authorization"), vec!["Bearer secret"]);
    assert_eq!(request.body, r#"{"message":"hi"}"#);
}

#[tokio::test]
async fn error_status_carries_code_and_body() {
    let (addr, _requests) = start_mock_endpoint(Reply::Status(500, "server error")).await;

    let result = direct_transport()
        .send(b"{}".to_vec(), &endpoint(addr), &Headers::new())
        .await;

    match result {
        Err(SendError::ErrorStatusCode { code, body }) => {
            assert_eq!(code, 500);
            assert_eq!(body.as_deref(), Some("server error"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn empty_error_body_is_absent() {
    let (addr, _requests) = start_mock_endpoint(Reply::Status(404, "")).await;

    let result = direct_transport()
        .send(b"{}".to_vec(), &endpoint(addr), &Headers::new())
        .await;

    assert!(matches!(
        result,
        Err(SendError::ErrorStatusCode { code: 404, body: None })
    ));
}

#[tokio::test]
async fn non_http_reply_is_an_invalid_response() {
    let (addr, _requests) = start_mock_endpoint(Reply::Garbage("NOT HTTP AT ALL\r\n\r\n")).await;

    let result = direct_transport()
        .send(b"{}".to_vec(), &endpoint(addr), &Headers::new())
        .await;

    assert!(matches!(result, Err(SendError::InvalidResponseType)), "{result:?}");
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let addr = closed_port().await;

    let result = direct_transport()
        .send(b"{}".to_vec(), &endpoint(addr), &Headers::new())
        .await;

    assert!(matches!(result, Err(SendError::Transport(_))), "{result:?}");
}
