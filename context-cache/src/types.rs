//! Core types: cached message, contact info, and the assembled context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of one Chatwoot conversation; the cache key.
pub type ConversationId = i64;

/// Direction of a recorded message (from the customer or from the bot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

/// Sender name used when the platform gives us none.
pub const UNKNOWN_SENDER: &str = "unknown";

/// One recorded conversation turn.
///
/// `timestamp` is assigned by [`ConversationCache::record`] on insert and is
/// monotonically non-decreasing per process.
///
/// [`ConversationCache::record`]: crate::cache::ConversationCache::record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedMessage {
    pub content: String,
    pub direction: MessageDirection,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
}

impl CachedMessage {
    /// Creates a message with the given timestamp. Empty sender names become
    /// [`UNKNOWN_SENDER`].
    pub fn new(
        content: impl Into<String>,
        direction: MessageDirection,
        sender: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let sender = sender.into();
        let sender = if sender.trim().is_empty() {
            UNKNOWN_SENDER.to_string()
        } else {
            sender
        };
        Self {
            content: content.into(),
            direction,
            sender,
            timestamp,
        }
    }

    /// Returns true if the message was authored by the customer.
    pub fn is_incoming(&self) -> bool {
        self.direction == MessageDirection::Incoming
    }
}

/// Customer identity fields passed through from the webhook payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Elevated-engagement flag derived from the exposed history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionLevel {
    HighEngagement,
}

/// The context bundle handed to the AI client for one reply generation.
///
/// Built by [`ContextAssembler::build`] and discarded after use; nothing
/// holds on to it past the request.
///
/// [`ContextAssembler::build`]: crate::assembler::ContextAssembler::build
#[derive(Debug, Clone, Serialize)]
pub struct ConversationContext {
    /// Customer display name, empty when unknown.
    pub customer_name: String,
    /// Customer email, empty when unknown.
    pub customer_email: String,
    pub conversation_id: ConversationId,
    /// Conversation status as reported by the platform, `"open"` by default.
    pub conversation_status: String,
    /// Up to the last 5 messages of the conversation, oldest first.
    pub conversation_history: Vec<CachedMessage>,
    /// Keywords detected in the customer's recent messages, first-seen order.
    pub recent_topics: Vec<String>,
    /// Set when the customer has been particularly active in the recent
    /// history; absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_level: Option<InteractionLevel>,
}

impl ConversationContext {
    /// Returns true if no history could be resolved for the conversation.
    pub fn is_empty(&self) -> bool {
        self.conversation_history.is_empty()
    }
}
