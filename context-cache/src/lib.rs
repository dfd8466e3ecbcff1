//! # Conversation context cache
//!
//! Short-term conversational memory for the Chatwoot bot, plus the assembly
//! of the context object handed to the AI client for each reply.
//!
//! ## Components
//!
//! - [`ConversationCache`] — in-memory, TTL-bounded store of the most recent
//!   messages per conversation. Capped at [`MAX_MESSAGES_PER_CONVERSATION`]
//!   messages per conversation; idle conversations are swept after
//!   [`DEFAULT_TTL_SECS`] seconds.
//! - [`ContextAssembler`] — builds a [`ConversationContext`] for one inbound
//!   message from the cache, falling back to an external [`HistoryFetcher`]
//!   when the conversation is not cached, and derives recent topics and the
//!   customer's interaction level.
//!
//! ## Modules
//!
//! - [`types`] - Message, contact, and context types
//! - [`clock`] - Injectable time source
//! - [`cache`] - The conversation cache
//! - [`assembler`] - Context assembly and derived signals
//!
//! ## External Interactions
//!
//! The crate performs no I/O of its own. The only external call is the
//! history-fetch fallback behind the [`HistoryFetcher`] trait, implemented by
//! the Chatwoot API client in the service. A restart loses all cached
//! context; the cache is a performance optimization over the external fetch,
//! not a durability guarantee.

pub mod assembler;
pub mod cache;
pub mod clock;
pub mod types;

pub use assembler::{ContextAssembler, HistoryFetcher, HIGH_ENGAGEMENT_THRESHOLD, TOPIC_KEYWORDS};
pub use cache::{ConversationCache, DEFAULT_TTL_SECS, MAX_MESSAGES_PER_CONVERSATION};
pub use clock::{Clock, SystemClock};
pub use types::{
    CachedMessage, ContactInfo, ConversationContext, ConversationId, InteractionLevel,
    MessageDirection,
};
