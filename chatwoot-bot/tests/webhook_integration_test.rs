//! End-to-end tests for the webhook route: every delivery gets 204, and a
//! customer message flows through cache, context, generation, and send.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use chatwoot_bot::webhook::{router, AppState};
use chatwoot_bot::MessageProcessor;
use chatwoot_client::MessageSender;
use context_cache::{
    CachedMessage, ContextAssembler, ConversationCache, ConversationContext, HistoryFetcher,
};
use gemini_client::ReplyGenerator;

struct NoHistory;

#[async_trait]
impl HistoryFetcher for NoHistory {
    async fn fetch_recent_messages(
        &self,
        _account_id: i64,
        _conversation_id: i64,
    ) -> anyhow::Result<Vec<CachedMessage>> {
        Ok(Vec::new())
    }
}

struct EchoGenerator;

#[async_trait]
impl ReplyGenerator for EchoGenerator {
    async fn generate(&self, message: &str, _context: &ConversationContext) -> String {
        format!("echo: {message}")
    }
}

struct RecordingSender {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_reply(
        &self,
        _account_id: i64,
        conversation_id: i64,
        content: &str,
    ) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((conversation_id, content.to_string()));
        Ok(())
    }
}

fn test_app() -> (axum::Router, Arc<RecordingSender>, ConversationCache) {
    let cache = ConversationCache::new();
    let assembler = ContextAssembler::new(cache.clone(), Arc::new(NoHistory));
    let sender = Arc::new(RecordingSender {
        sent: Mutex::new(Vec::new()),
    });
    let processor = MessageProcessor::new(
        cache.clone(),
        assembler,
        Arc::new(EchoGenerator),
        sender.clone(),
        1,
    );
    let app = router(Arc::new(AppState { processor }));
    (app, sender, cache)
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn customer_message_returns_204_and_sends_reply() {
    let (app, sender, cache) = test_app();

    let response = app
        .oneshot(post_json(
            r#"{
                "event": "message_created",
                "message_type": 0,
                "content": "I need help with my refund",
                "conversation": {"id": 42, "status": "open",
                                 "contact": {"name": "Alice", "email": "alice@example.com"}},
                "sender": {"name": "Alice"}
            }"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let sent = sender.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], (42, "echo: I need help with my refund".to_string()));

    let history = cache.recent(42, 10).await;
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn non_message_event_still_returns_204() {
    let (app, sender, _cache) = test_app();

    let response = app
        .oneshot(post_json(r#"{"event": "conversation_status_changed"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn outgoing_message_event_is_not_answered() {
    let (app, sender, _cache) = test_app();

    let response = app
        .oneshot(post_json(
            r#"{
                "event": "message_created",
                "message_type": 1,
                "content": "agent reply",
                "conversation": {"id": 42}
            }"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(sender.sent.lock().unwrap().is_empty());
}
