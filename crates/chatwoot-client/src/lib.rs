//! # Chatwoot API client
//!
//! Thin client for the two Chatwoot endpoints the bot needs: listing a
//! conversation's messages (context fallback) and posting the bot's reply.
//! Authenticates with the `api_access_token` header.
//!
//! Implements [`HistoryFetcher`] for the context assembler and
//! [`MessageSender`] for reply delivery, so the service can hold both
//! capabilities as trait objects and tests can substitute mocks.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use context_cache::{CachedMessage, ConversationId, HistoryFetcher, MessageDirection};

/// Timeout applied to every Chatwoot API call; a timed-out history fetch is
/// handled like any other fetch failure upstream.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Chatwoot API failure.
#[derive(Error, Debug)]
pub enum ChatwootError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chatwoot API error: status {status}")]
    Api { status: u16 },
}

/// One message as returned by the Chatwoot messages endpoint. Only the
/// fields the bot reads; everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatwootMessage {
    #[serde(default)]
    pub content: Option<String>,
    /// 0 = incoming (customer), 1 = outgoing (agent/bot).
    #[serde(default)]
    pub message_type: i64,
    #[serde(default)]
    pub sender: Option<ChatwootSender>,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatwootSender {
    #[serde(default)]
    pub name: Option<String>,
}

impl ChatwootMessage {
    /// Converts to a [`CachedMessage`]; `None` for non-text or empty
    /// messages, which must not enter the context history.
    pub fn to_cached(&self) -> Option<CachedMessage> {
        let content = self.content.as_deref()?.trim();
        if content.is_empty() {
            return None;
        }
        let direction = if self.message_type == 0 {
            MessageDirection::Incoming
        } else {
            MessageDirection::Outgoing
        };
        let sender = self
            .sender
            .as_ref()
            .and_then(|s| s.name.clone())
            .unwrap_or_default();
        let timestamp = self
            .created_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now);
        Some(CachedMessage::new(content, direction, sender, timestamp))
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    payload: Vec<ChatwootMessage>,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    content: &'a str,
    message_type: &'a str,
    private: bool,
}

/// Capability to deliver a reply into a conversation.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_reply(
        &self,
        account_id: i64,
        conversation_id: ConversationId,
        content: &str,
    ) -> anyhow::Result<()>;
}

/// Chatwoot REST client.
#[derive(Debug, Clone)]
pub struct ChatwootClient {
    client: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl ChatwootClient {
    /// Creates a client for the given Chatwoot instance. The base URL may
    /// carry a trailing slash. All requests share one timeout policy.
    pub fn new(base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            access_key: access_key.into(),
        }
    }

    fn messages_url(&self, account_id: i64, conversation_id: ConversationId) -> String {
        format!(
            "{}/api/v1/accounts/{}/conversations/{}/messages",
            self.base_url, account_id, conversation_id
        )
    }

    /// Lists a conversation's messages, oldest first, as Chatwoot returns
    /// them.
    pub async fn list_messages(
        &self,
        account_id: i64,
        conversation_id: ConversationId,
    ) -> Result<Vec<ChatwootMessage>, ChatwootError> {
        let url = self.messages_url(account_id, conversation_id);
        debug!(conversation_id, "listing conversation messages");

        let response = self
            .client
            .get(&url)
            .header("api_access_token", &self.access_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatwootError::Api {
                status: status.as_u16(),
            });
        }

        let body: MessagesResponse = response.json().await?;
        debug!(
            conversation_id,
            message_count = body.payload.len(),
            "listed conversation messages"
        );
        Ok(body.payload)
    }

    /// Posts an outgoing, public message into a conversation.
    pub async fn create_message(
        &self,
        account_id: i64,
        conversation_id: ConversationId,
        content: &str,
    ) -> Result<(), ChatwootError> {
        let url = self.messages_url(account_id, conversation_id);
        let request = CreateMessageRequest {
            content,
            message_type: "outgoing",
            private: false,
        };

        let response = self
            .client
            .post(&url)
            .header("api_access_token", &self.access_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatwootError::Api {
                status: status.as_u16(),
            });
        }

        info!(conversation_id, "sent reply to conversation");
        Ok(())
    }
}

#[async_trait]
impl HistoryFetcher for ChatwootClient {
    async fn fetch_recent_messages(
        &self,
        account_id: i64,
        conversation_id: ConversationId,
    ) -> anyhow::Result<Vec<CachedMessage>> {
        let messages = self.list_messages(account_id, conversation_id).await?;
        Ok(messages.iter().filter_map(ChatwootMessage::to_cached).collect())
    }
}

#[async_trait]
impl MessageSender for ChatwootClient {
    async fn send_reply(
        &self,
        account_id: i64,
        conversation_id: ConversationId,
        content: &str,
    ) -> anyhow::Result<()> {
        self.create_message(account_id, conversation_id, content)
            .await?;
        Ok(())
    }
}
