//! Context assembly and derived conversational signals.
//!
//! [`ContextAssembler`] reads the cache (or the external history fetch when
//! the conversation is not cached) and produces the [`ConversationContext`]
//! handed to the AI client: bounded history, recent topic keywords, and an
//! engagement flag.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::cache::ConversationCache;
use crate::types::{
    CachedMessage, ContactInfo, ConversationContext, ConversationId, InteractionLevel,
};

/// Messages of history exposed to the AI client.
pub const HISTORY_WINDOW: usize = 5;

/// Customer messages scanned for topic keywords.
pub const TOPIC_SCAN_WINDOW: usize = 3;

/// Incoming messages in the exposed history that flag high engagement.
pub const HIGH_ENGAGEMENT_THRESHOLD: usize = 3;

/// Keywords looked up (case-insensitively) in the customer's recent messages.
pub const TOPIC_KEYWORDS: [&str; 8] = [
    "order", "payment", "delivery", "refund", "support", "problem", "issue", "help",
];

/// External history-fetch capability, implemented by the Chatwoot client.
///
/// May fail; the assembler treats any failure — including timeouts — as "no
/// history" and never propagates it.
#[async_trait]
pub trait HistoryFetcher: Send + Sync {
    async fn fetch_recent_messages(
        &self,
        account_id: i64,
        conversation_id: ConversationId,
    ) -> anyhow::Result<Vec<CachedMessage>>;
}

/// Builds the per-reply [`ConversationContext`] from cache or fetched
/// history.
#[derive(Clone)]
pub struct ContextAssembler {
    cache: ConversationCache,
    history: Arc<dyn HistoryFetcher>,
}

impl ContextAssembler {
    pub fn new(cache: ConversationCache, history: Arc<dyn HistoryFetcher>) -> Self {
        Self { cache, history }
    }

    /// Assembles the context for one inbound message. Infallible: every
    /// failure path degrades to empty/default fields.
    ///
    /// History comes from the cache when the conversation has any fresh
    /// entry; otherwise one external fetch is made and its last
    /// [`HISTORY_WINDOW`] messages are used. A first-ever message and a
    /// cache miss after expiry are deliberately indistinguishable — both
    /// fall back to the fetch. Does not mutate the cache.
    #[instrument(skip(self, contact))]
    pub async fn build(
        &self,
        conversation_id: ConversationId,
        contact: Option<&ContactInfo>,
        status: Option<&str>,
        account_id: i64,
    ) -> ConversationContext {
        let customer_name = contact
            .and_then(|c| c.name.clone())
            .unwrap_or_default();
        let customer_email = contact
            .and_then(|c| c.email.clone())
            .unwrap_or_default();
        let conversation_status = status.unwrap_or("open").to_string();

        let mut conversation_history = self.cache.recent(conversation_id, HISTORY_WINDOW).await;
        if conversation_history.is_empty() {
            conversation_history = match self
                .history
                .fetch_recent_messages(account_id, conversation_id)
                .await
            {
                Ok(mut fetched) => {
                    let excess = fetched.len().saturating_sub(HISTORY_WINDOW);
                    fetched.drain(..excess);
                    debug!(
                        conversation_id,
                        fetched = fetched.len(),
                        "resolved history from external fetch"
                    );
                    fetched
                }
                Err(error) => {
                    warn!(conversation_id, %error, "could not fetch conversation history");
                    Vec::new()
                }
            };
        }

        let recent_topics = detect_topics(&conversation_history);
        let interaction_level = interaction_level(&conversation_history);

        ConversationContext {
            customer_name,
            customer_email,
            conversation_id,
            conversation_status,
            conversation_history,
            recent_topics,
            interaction_level,
        }
    }
}

/// Collects topic keywords from the last [`TOPIC_SCAN_WINDOW`]
/// customer-authored messages, each keyword once, ordered by where it first
/// appears in the text.
fn detect_topics(history: &[CachedMessage]) -> Vec<String> {
    let customer: Vec<&CachedMessage> =
        history.iter().filter(|m| m.is_incoming()).collect();
    let start = customer.len().saturating_sub(TOPIC_SCAN_WINDOW);

    let mut topics: Vec<String> = Vec::new();
    for message in &customer[start..] {
        let text = message.content.to_lowercase();
        let mut found: Vec<(usize, &str)> = TOPIC_KEYWORDS
            .iter()
            .filter_map(|keyword| text.find(keyword).map(|at| (at, *keyword)))
            .collect();
        found.sort_by_key(|(at, _)| *at);
        for (_, keyword) in found {
            if !topics.iter().any(|t| t == keyword) {
                topics.push(keyword.to_string());
            }
        }
    }
    topics
}

/// High engagement when at least [`HIGH_ENGAGEMENT_THRESHOLD`] of the
/// exposed messages are customer-authored.
fn interaction_level(history: &[CachedMessage]) -> Option<InteractionLevel> {
    let incoming = history.iter().filter(|m| m.is_incoming()).count();
    (incoming >= HIGH_ENGAGEMENT_THRESHOLD).then_some(InteractionLevel::HighEngagement)
}
