//! Webhook payload model and HTTP routes.
//!
//! Chatwoot delivers every conversation event to `POST /`. The handler
//! always answers `204 No Content`: delivery retries are the platform's
//! concern, and a processing failure must never bounce the webhook.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tracing::debug;

use crate::processor::MessageProcessor;

/// The slice of a Chatwoot webhook payload the bot reads. Unknown fields are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event: Option<String>,
    /// 0 = incoming (customer), 1 = outgoing (agent/bot).
    #[serde(default)]
    pub message_type: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub conversation: Option<ConversationPayload>,
    #[serde(default)]
    pub sender: Option<SenderPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contact: Option<ContactPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenderPayload {
    #[serde(default)]
    pub name: Option<String>,
}

/// Shared state for the webhook routes.
pub struct AppState {
    pub processor: MessageProcessor,
}

/// Builds the router: one webhook endpoint at `/`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().route("/", post(handle_webhook)).with_state(state)
}

async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    Json(event): Json<WebhookEvent>,
) -> StatusCode {
    debug!(event = event.event.as_deref().unwrap_or("unknown"), "received webhook");
    state.processor.process_event(event).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_chatwoot_payload() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{
                "event": "message_created",
                "message_type": 0,
                "content": "My order hasn't arrived",
                "conversation": {
                    "id": 42,
                    "status": "open",
                    "contact": {"name": "Alice", "email": "alice@example.com"},
                    "unread_count": 3
                },
                "sender": {"name": "Alice", "id": 7},
                "account": {"id": 1}
            }"#,
        )
        .unwrap();

        assert_eq!(event.message_type, Some(0));
        assert_eq!(event.content.as_deref(), Some("My order hasn't arrived"));
        let conversation = event.conversation.unwrap();
        assert_eq!(conversation.id, Some(42));
        assert_eq!(conversation.status.as_deref(), Some("open"));
        assert_eq!(
            conversation.contact.unwrap().email.as_deref(),
            Some("alice@example.com")
        );
    }

    #[test]
    fn tolerates_sparse_payloads() {
        let event: WebhookEvent = serde_json::from_str(r#"{"event": "conversation_updated"}"#).unwrap();
        assert!(event.message_type.is_none());
        assert!(event.conversation.is_none());
    }
}
