mod common;

use std::time::Duration;

use common::*;
use futures::future::join_all;
use serde_json::json;
use whatsapp_cloud_rs::{
    error::Expected,
    message::{send_text, SendTextRequest},
    send, Error, RequestParams,
};
use wiremock::{
    matchers::{bearer_token, body_string, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn params(mock_server: &MockServer) -> RequestParams {
    RequestParams::messages(mock_server.uri(), API_VERSION, PHONE_ID).bearer(ACCESS_TOKEN)
}

/// Tests that a structured error body is surfaced with the observed HTTP status.
#[tokio::test]
async fn test_error_body_carries_http_status() {
    let mock_server = MockServer::start().await;
    // Arrange
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 131030,
            "error": {
                "message": "(#131030) Recipient phone number not in allowed list",
                "type": "OAuthException",
                "code": 131030,
                "error_data": {
                    "messaging_product": "whatsapp",
                    "details": "Recipient phone number not in allowed list"
                },
                "fbtrace_id": "AxYz"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Act
    let http = reqwest::Client::new();
    let result = send_text(
        &http,
        &params(&mock_server),
        &SendTextRequest::new(RECIPIENT_ID, "hi"),
    )
    .await;

    // Assert
    let err = result.unwrap_err();
    let api = err.api_error().expect("structured error");
    assert_eq!(api.code, 400);
    let meta = api.error.as_ref().unwrap();
    assert_eq!(meta.code, 131030);
    assert_eq!(meta.fbtrace_id.as_deref(), Some("AxYz"));
}

/// Tests that a 200 with an unparsable body is a decode failure, not a success.
#[tokio::test]
async fn test_success_with_garbage_body() {
    let mock_server = MockServer::start().await;
    // Arrange
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    // Act
    let http = reqwest::Client::new();
    let result = send(&http, &params(&mock_server), Some(b"{}".to_vec())).await;

    // Assert
    match result {
        Err(Error::Parse(err)) => {
            assert_eq!(err.status, 200);
            assert_eq!(err.expected, Expected::Success);
            assert_eq!(err.body, "not json");
        }
        other => panic!("expected decode failure, got {other:?}"),
    }
}

/// Tests that an unparsable error body is a decode failure for the error shape.
#[tokio::test]
async fn test_server_error_with_html_body() {
    let mock_server = MockServer::start().await;
    // Arrange
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .respond_with(
            ResponseTemplate::new(503).set_body_string("<html>Service Unavailable</html>"),
        )
        .mount(&mock_server)
        .await;

    // Act
    let result = send(&reqwest::Client::new(), &params(&mock_server), None).await;

    // Assert
    let err = result.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
    assert!(matches!(err, Error::Parse(ref e) if e.expected == Expected::Error));
}

/// Tests bearer precedence, caller headers, query encoding and a body-less GET.
#[tokio::test]
async fn test_get_with_query_and_headers() {
    let mock_server = MockServer::start().await;
    // Arrange
    Mock::given(method("GET"))
        .and(path(format!(
            "/{}/{}/whatsapp_business_profile",
            API_VERSION, PHONE_ID
        )))
        .and(bearer_token(ACCESS_TOKEN))
        .and(header("x-request-source", "tests"))
        .and(query_param("fields", "about,address"))
        .and(query_param("note", "a b&c"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Act
    let params = RequestParams::new(
        format!("{}/", mock_server.uri()),
        format!("/{API_VERSION}/"),
        PHONE_ID,
        "/whatsapp_business_profile",
    )
    .header("Authorization", "Basic ignored")
    .header("X-Request-Source", "tests")
    .query("fields", "about,address")
    .query("note", "a b&c")
    .bearer(ACCESS_TOKEN);
    let result = send(&reqwest::Client::new(), &params, None).await;

    // Assert
    let response = result.unwrap();
    assert_eq!(response.message.success, Some(true));
    assert_eq!(response.message_id(), None);
}

/// Tests that the transport's deadline surfaces as a network error.
#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;
    // Arrange
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sent("wamid.late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    // Act
    let params = params(&mock_server).timeout(Duration::from_millis(100));
    let result = send(&reqwest::Client::new(), &params, Some(b"{}".to_vec())).await;

    // Assert
    assert!(matches!(result, Err(Error::Network(_))), "{result:?}");
}

/// Tests that an unreachable host is a network error, not a structured one.
#[tokio::test]
async fn test_unreachable_host() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let params = RequestParams::messages(uri, API_VERSION, PHONE_ID);
    let result = send(&reqwest::Client::new(), &params, None).await;

    assert!(matches!(result, Err(Error::Network(_))), "{result:?}");
}

/// Tests that independent calls share one client and run concurrently.
#[tokio::test]
async fn test_concurrent_sends() {
    let mock_server = MockServer::start().await;
    // Arrange
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .and(bearer_token(ACCESS_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent("wamid.bulk")))
        .expect(5)
        .mount(&mock_server)
        .await;

    let messages = client(&mock_server).message(PHONE_ID);

    // Act
    let results = join_all((0..5).map(|i| {
        let messages = messages.clone();
        async move {
            messages
                .send_text(format!("1650555000{i}"), format!("Hi #{i}"), false)
                .await
        }
    }))
    .await;

    // Assert
    for result in results {
        assert_eq!(result.unwrap().message_id(), Some("wamid.bulk"));
    }
}
