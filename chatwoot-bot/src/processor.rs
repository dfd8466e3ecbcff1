//! The per-delivery message pipeline.
//!
//! For each incoming customer message: record it in the cache, assemble the
//! AI context, generate a reply, send it back through Chatwoot, and record
//! the outgoing turn. Every failure is logged and absorbed here — nothing
//! propagates out to the webhook handler.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use chatwoot_client::MessageSender;
use context_cache::{ContactInfo, ContextAssembler, ConversationCache, MessageDirection};
use gemini_client::ReplyGenerator;

use crate::webhook::WebhookEvent;

/// Sender name recorded for the bot's own messages.
const BOT_SENDER: &str = "bot";

/// Processes webhook events into cached turns and outgoing replies.
///
/// Collaborators are trait objects so tests can swap in mocks; the cache and
/// assembler are the real thing (they are in-memory anyway).
#[derive(Clone)]
pub struct MessageProcessor {
    cache: ConversationCache,
    assembler: ContextAssembler,
    generator: Arc<dyn ReplyGenerator>,
    sender: Arc<dyn MessageSender>,
    account_id: i64,
}

impl MessageProcessor {
    pub fn new(
        cache: ConversationCache,
        assembler: ContextAssembler,
        generator: Arc<dyn ReplyGenerator>,
        sender: Arc<dyn MessageSender>,
        account_id: i64,
    ) -> Self {
        Self {
            cache,
            assembler,
            generator,
            sender,
            account_id,
        }
    }

    /// Handles one webhook delivery end to end. Infallible: malformed or
    /// uninteresting events are skipped, downstream failures are logged.
    #[instrument(skip(self, event))]
    pub async fn process_event(&self, event: WebhookEvent) {
        // Only customer messages (message_type = 0) with text get a reply.
        if event.message_type != Some(0) {
            debug!("skipping non-customer message");
            return;
        }
        let content = match event.content.as_deref().map(str::trim) {
            Some(content) if !content.is_empty() => content.to_string(),
            _ => {
                debug!("skipping empty message");
                return;
            }
        };
        let Some(conversation) = event.conversation else {
            warn!("webhook event has no conversation");
            return;
        };
        let Some(conversation_id) = conversation.id else {
            warn!("no conversation ID found");
            return;
        };

        let sender_name = event
            .sender
            .as_ref()
            .and_then(|s| s.name.clone())
            .unwrap_or_default();
        self.cache
            .record(
                conversation_id,
                &content,
                MessageDirection::Incoming,
                &sender_name,
            )
            .await;

        let contact = conversation.contact.map(|c| ContactInfo {
            name: c.name,
            email: c.email,
        });
        let context = self
            .assembler
            .build(
                conversation_id,
                contact.as_ref(),
                conversation.status.as_deref(),
                self.account_id,
            )
            .await;

        let reply = self.generator.generate(&content, &context).await;

        match self
            .sender
            .send_reply(self.account_id, conversation_id, &reply)
            .await
        {
            Ok(()) => {
                // Record the outgoing turn only once it actually reached the
                // conversation.
                self.cache
                    .record(conversation_id, &reply, MessageDirection::Outgoing, BOT_SENDER)
                    .await;
                info!(conversation_id, "sent AI response to conversation");
            }
            Err(e) => {
                error!(conversation_id, error = %e, "error sending response to Chatwoot");
            }
        }
    }
}
