//! In-memory conversation cache.
//!
//! Keeps, per conversation, a capped window of the most recent messages and
//! the time of the last update. Stale conversations are swept lazily on
//! every write; see [`ConversationCache::record`].
//!
//! ## Thread Safety
//!
//! The cache is shared process-wide behind `Arc<RwLock<..>>`. All writes go
//! through a single write lock, so two `record` calls for the same
//! conversation are serialized in program order; reads run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::types::{CachedMessage, ConversationId, MessageDirection};

/// Maximum number of messages kept per conversation; older messages are
/// evicted oldest-first.
pub const MAX_MESSAGES_PER_CONVERSATION: usize = 10;

/// Idle time after which a conversation's cached context is stale (2 hours).
pub const DEFAULT_TTL_SECS: i64 = 2 * 60 * 60;

/// Recent messages and last-touch time of one conversation.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Insertion order, oldest first.
    messages: Vec<CachedMessage>,
    last_updated: DateTime<Utc>,
}

#[derive(Debug)]
struct CacheInner {
    entries: HashMap<ConversationId, CacheEntry>,
    /// Last timestamp handed out; inserts clamp against it so per-process
    /// timestamps never decrease even if the wall clock steps backwards.
    last_timestamp: DateTime<Utc>,
}

/// In-memory, time-bounded store of recent messages per conversation.
///
/// Cloning is cheap and all clones share the same state. Nothing is
/// persisted: a restart loses all cached context, and the assembler falls
/// back to the external history fetch.
///
/// Conversation ids accumulate between sweeps; the lazy TTL sweep on every
/// write is the only bound on idle growth, which is accepted for the volume
/// this bot serves.
#[derive(Clone)]
pub struct ConversationCache {
    inner: Arc<RwLock<CacheInner>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ConversationCache {
    /// Creates a cache with the default TTL and the system clock.
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }

    /// Creates a cache with a custom TTL and the system clock.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_ttl_and_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with a custom TTL and time source. Tests use this to
    /// drive expiry without waiting.
    pub fn with_ttl_and_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                entries: HashMap::new(),
                last_timestamp: DateTime::<Utc>::MIN_UTC,
            })),
            ttl,
            clock,
        }
    }

    /// Records one message for a conversation, creating the entry if absent.
    ///
    /// Before mutating, sweeps **every** conversation whose last update is
    /// older than the TTL — unrelated stale conversations disappear as a
    /// side effect of any write. The appended message gets a server-assigned
    /// timestamp, and the entry is truncated to the most recent
    /// [`MAX_MESSAGES_PER_CONVERSATION`] messages. Never fails.
    pub async fn record(
        &self,
        conversation_id: ConversationId,
        content: &str,
        direction: MessageDirection,
        sender: &str,
    ) {
        let mut inner = self.inner.write().await;
        let now = self.clock.now();

        let before = inner.entries.len();
        let ttl = self.ttl;
        inner.entries.retain(|_, entry| now - entry.last_updated <= ttl);
        let swept = before - inner.entries.len();
        if swept > 0 {
            debug!(swept, "swept expired conversations");
        }

        let timestamp = now.max(inner.last_timestamp);
        inner.last_timestamp = timestamp;

        let entry = inner
            .entries
            .entry(conversation_id)
            .or_insert_with(|| CacheEntry {
                messages: Vec::new(),
                last_updated: now,
            });
        entry
            .messages
            .push(CachedMessage::new(content, direction, sender, timestamp));
        if entry.messages.len() > MAX_MESSAGES_PER_CONVERSATION {
            let excess = entry.messages.len() - MAX_MESSAGES_PER_CONVERSATION;
            entry.messages.drain(..excess);
        }
        entry.last_updated = now;

        debug!(
            conversation_id,
            message_count = entry.messages.len(),
            "recorded message"
        );
    }

    /// Returns up to `limit` most recent messages for a conversation, oldest
    /// first.
    ///
    /// Empty when the conversation is absent or its entry has outlived the
    /// TTL; an expired entry is never readable even before a write sweeps
    /// it. Read-only: does not evict. Never fails.
    pub async fn recent(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Vec<CachedMessage> {
        let inner = self.inner.read().await;
        let Some(entry) = inner.entries.get(&conversation_id) else {
            return Vec::new();
        };
        if self.clock.now() - entry.last_updated > self.ttl {
            return Vec::new();
        }
        let start = entry.messages.len().saturating_sub(limit);
        entry.messages[start..].to_vec()
    }

    /// Number of conversations currently tracked (including not-yet-swept
    /// expired ones).
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns true if no conversations are tracked.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ConversationCache {
    fn default() -> Self {
        Self::new()
    }
}
