use ledgerbot_core::ExpenseRecord;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tokio::time::Instant;

/// Default idle lifetime of a pending session.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

const SHARD_COUNT: usize = 16;

/// An expense waiting for its receipt.
///
/// `row_index` is the 1-based ledger row the append landed in, captured
/// from the append result itself, so the receipt patches exactly that row
/// no matter how many other conversations appended in between.
#[derive(Debug, Clone)]
pub struct PendingSession {
    /// Conversation (chat) this session belongs to.
    pub conversation_id: String,
    /// The appended record.
    pub record: ExpenseRecord,
    /// 1-based ledger row written by the append.
    pub row_index: u32,
    /// When the session was created.
    pub created_at: Instant,
}

/// Keyed store of pending sessions, one at most per conversation.
///
/// Keys are spread over a fixed set of shards, each behind its own mutex,
/// so conversations do not contend with each other. Critical sections are
/// plain map operations; no lock is ever held across an `.await`.
pub struct PendingStore {
    ttl: Duration,
    shards: Vec<Mutex<HashMap<String, PendingSession>>>,
}

impl PendingStore {
    /// Create a store with the given idle TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, conversation_id: &str) -> &Mutex<HashMap<String, PendingSession>> {
        let mut hasher = DefaultHasher::new();
        conversation_id.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Store a session for a conversation, replacing any existing one.
    ///
    /// Last write wins: if the conversation already had an unconsumed
    /// session, that session's row is left without a receipt link
    /// permanently.
    pub fn put(&self, conversation_id: &str, record: ExpenseRecord, row_index: u32) {
        let session = PendingSession {
            conversation_id: conversation_id.to_string(),
            record,
            row_index,
            created_at: Instant::now(),
        };
        self.shard(conversation_id)
            .lock()
            .insert(conversation_id.to_string(), session);
    }

    /// Atomically remove and return the conversation's session.
    ///
    /// Returns `None` when there is no session or the stored one has
    /// outlived the TTL; an expired session is dropped on the spot.
    pub fn take(&self, conversation_id: &str) -> Option<PendingSession> {
        let session = self.shard(conversation_id).lock().remove(conversation_id)?;
        if session.created_at.elapsed() > self.ttl {
            return None;
        }
        Some(session)
    }

    /// Drop every session older than the TTL. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let ttl = self.ttl;
        let mut removed = 0;
        for shard in &self.shards {
            let mut map = shard.lock();
            let before = map.len();
            map.retain(|_, s| s.created_at.elapsed() <= ttl);
            removed += before - map.len();
        }
        removed
    }

    /// Number of sessions currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    /// Whether the store holds no sessions at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
