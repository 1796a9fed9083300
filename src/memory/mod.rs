pub mod buffer;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::types::Turn;
use buffer::ConversationBuffer;

/// Buffer key used when a request carries no user id.
pub const ANONYMOUS_USER: &str = "anon";

/// Maximum turns retained per user.
pub const BUFFER_CAPACITY: usize = 20;

/// Map a caller-supplied user id to a buffer key.
///
/// Missing, empty and whitespace-only ids share the anonymous buffer. Any
/// other id is used verbatim, so `" bob"` and `"bob"` are different users.
pub fn normalize_user_id(user_id: Option<&str>) -> &str {
    match user_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => ANONYMOUS_USER,
    }
}

/// Short-term conversation memory keyed by user id.
///
/// The in-process [`MemoryStore`] is the only implementation today. An
/// external keyed store must provide an atomic per-key append-and-trim for
/// `record`.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Append a turn to the user's buffer, evicting the oldest turn when the
    /// buffer is full. Never fails.
    async fn record(&self, user_id: &str, turn: Turn);

    /// The last `limit` turns for the user, oldest first. Does not mutate.
    async fn recent_turns(&self, user_id: &str, limit: usize) -> Vec<Turn>;
}

/// Process-local memory. Lost on restart.
///
/// Each user's buffer sits behind its own lock, so concurrent requests for
/// the same user serialize their appends while different users proceed in
/// parallel.
pub struct MemoryStore {
    capacity: usize,
    buffers: RwLock<HashMap<String, Arc<Mutex<ConversationBuffer>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            buffers: RwLock::new(HashMap::new()),
        }
    }

    async fn buffer(&self, key: &str) -> Option<Arc<Mutex<ConversationBuffer>>> {
        self.buffers.read().await.get(key).map(Arc::clone)
    }

    async fn buffer_or_create(&self, key: &str) -> Arc<Mutex<ConversationBuffer>> {
        if let Some(buffer) = self.buffer(key).await {
            return buffer;
        }

        let mut buffers = self.buffers.write().await;
        Arc::clone(buffers.entry(key.to_string()).or_insert_with(|| {
            debug!(user = %key, "creating conversation buffer");
            Arc::new(Mutex::new(ConversationBuffer::new(self.capacity)))
        }))
    }

    /// Number of turns currently held for a user.
    pub async fn len(&self, user_id: &str) -> usize {
        let key = normalize_user_id(Some(user_id));
        match self.buffer(key).await {
            Some(buffer) => buffer.lock().await.len(),
            None => 0,
        }
    }

    /// Number of users with a buffer.
    pub async fn user_count(&self) -> usize {
        self.buffers.read().await.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationMemory for MemoryStore {
    async fn record(&self, user_id: &str, turn: Turn) {
        let key = normalize_user_id(Some(user_id));
        let buffer = self.buffer_or_create(key).await;
        let mut buffer = buffer.lock().await;
        buffer.push(turn);
        debug!(user = %key, len = buffer.len(), "recorded turn");
    }

    async fn recent_turns(&self, user_id: &str, limit: usize) -> Vec<Turn> {
        let key = normalize_user_id(Some(user_id));
        match self.buffer(key).await {
            Some(buffer) => buffer.lock().await.recent(limit),
            None => Vec::new(),
        }
    }
}
