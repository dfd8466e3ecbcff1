//! HTTP-level tests for GeminiClient against a mockito server.

use context_cache::ConversationContext;
use gemini_client::{GeminiClient, EMPTY_RESPONSE_FALLBACK, ERROR_FALLBACK};

fn empty_context() -> ConversationContext {
    ConversationContext {
        customer_name: String::new(),
        customer_email: String::new(),
        conversation_id: 42,
        conversation_status: "open".to_string(),
        conversation_history: Vec::new(),
        recent_topics: Vec::new(),
        interaction_level: None,
    }
}

#[tokio::test]
async fn generate_reply_returns_trimmed_candidate_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/test-model:generateContent")
        .match_query(mockito::Matcher::UrlEncoded(
            "key".into(),
            "test-key".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "  Hello Alice!  "}]}}
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = GeminiClient::new("test-key", "test-model").with_base_url(server.url());
    let reply = client.generate_reply("hi", &empty_context()).await;

    mock.assert_async().await;
    assert_eq!(reply, "Hello Alice!");
}

#[tokio::test]
async fn generate_reply_joins_multiple_parts() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/models/test-model:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "Hello "}, {"text": "Alice!"}]}}
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = GeminiClient::new("test-key", "test-model").with_base_url(server.url());
    let reply = client.generate_reply("hi", &empty_context()).await;

    assert_eq!(reply, "Hello Alice!");
}

#[tokio::test]
async fn empty_candidates_fall_back_to_apology() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/models/test-model:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates": []}"#)
        .create_async()
        .await;

    let client = GeminiClient::new("test-key", "test-model").with_base_url(server.url());
    let reply = client.generate_reply("hi", &empty_context()).await;

    assert_eq!(reply, EMPTY_RESPONSE_FALLBACK);
}

#[tokio::test]
async fn api_error_falls_back_to_technical_difficulties() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/models/test-model:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_body("oops")
        .create_async()
        .await;

    let client = GeminiClient::new("test-key", "test-model").with_base_url(server.url());
    let reply = client.generate_reply("hi", &empty_context()).await;

    assert_eq!(reply, ERROR_FALLBACK);
}

#[tokio::test]
async fn request_carries_generation_config() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/test-model:generateContent")
        .match_query(mockito::Matcher::Any)
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "generationConfig": {"maxOutputTokens": 256, "temperature": 0.2}
        })))
        .with_status(200)
        .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}"#)
        .create_async()
        .await;

    let client = GeminiClient::new("test-key", "test-model")
        .with_base_url(server.url())
        .with_max_tokens(256)
        .with_temperature(0.2);
    client.generate_reply("hi", &empty_context()).await;

    mock.assert_async().await;
}
