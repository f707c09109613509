//! Backend API contract tests.
//!
//! Verify exact HTTP format compliance for the three backend calls:
//! request shape, response parsing, and error mapping. Flow-level
//! behavior lives in `e2e_client.rs`; these tests pin the wire format.

use palaver::api::{ApiClient, ChatRequest};
use palaver::config::ApiConfig;
use palaver::error::ClientError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.uri(),
        uploads_prefix: "/uploads".to_owned(),
    })
}

fn request(message: &str, image: Option<&str>) -> ChatRequest {
    ChatRequest {
        message: message.to_owned(),
        session_id: "session-1".to_owned(),
        image_filename: image.map(str::to_owned),
        language: "en".to_owned(),
    }
}

#[tokio::test]
async fn chat_request_includes_required_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "message": "Hello",
            "session_id": "session-1",
            "image_filename": null,
            "language": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Hi there",
            "audio_url": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server).chat(&request("Hello", None)).await.unwrap();
    assert_eq!(reply.response, "Hi there");
    assert!(reply.audio_url.is_none());
}

#[tokio::test]
async fn chat_request_carries_pending_image() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"image_filename": "x.png"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "I see a cat",
            "audio_url": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server).chat(&request("", Some("x.png"))).await.unwrap();
    assert_eq!(reply.response, "I see a cat");
}

#[tokio::test]
async fn chat_reply_audio_url_may_be_absent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "text only"
        })))
        .mount(&server)
        .await;

    let reply = client(&server).chat(&request("hi", None)).await.unwrap();
    assert!(reply.audio_url.is_none());
}

#[tokio::test]
async fn chat_reply_audio_url_is_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "spoken",
            "audio_url": "/static/audio/reply.mp3"
        })))
        .mount(&server)
        .await;

    let reply = client(&server).chat(&request("hi", None)).await.unwrap();
    assert_eq!(reply.audio_url.as_deref(), Some("/static/audio/reply.mp3"));
}

#[tokio::test]
async fn non_success_status_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).chat(&request("hi", None)).await.unwrap_err();
    match err {
        ClientError::Api { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected api error, got {other}"),
    }
}

#[tokio::test]
async fn undecodable_body_maps_to_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).chat(&request("hi", None)).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn upload_is_multipart_with_an_image_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload_image"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"cat.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "image_filename": "cat_1.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let upload = client(&server)
        .upload_image("cat.png", b"fake png bytes".to_vec())
        .await
        .unwrap();
    assert_eq!(upload.image_filename, "cat_1.png");
}

#[tokio::test]
async fn upload_failure_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload_image"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "no file part"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .upload_image("cat.png", Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 400, .. }));
}

#[tokio::test]
async fn history_fetch_parses_the_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat_history/session-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {"sender": "user", "text": "hello", "image_filename": "x.png"},
                {"sender": "ai", "text": "hi there"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = client(&server).chat_history("session-1").await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].image_filename.as_deref(), Some("x.png"));
    assert!(records[1].image_filename.is_none());
}

#[tokio::test]
async fn history_session_id_is_percent_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat_history/weird%20session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let records = client(&server).chat_history("weird session").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn history_without_messages_key_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat_history/session-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let records = client(&server).chat_history("session-1").await.unwrap();
    assert!(records.is_empty());
}
