use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::parser::Identity;
use crate::question::Question;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub questions: Arc<[Question]>,
    pub created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// Time-bounded memo of parsed questions per request identity.
///
/// Sharded, so lookups and stores for different identities do not contend.
/// Expired entries are dropped lazily when read.
#[derive(Debug)]
pub struct GenerationCache {
    entries: DashMap<Identity, CacheEntry>,
    ttl: Duration,
}

impl Default for GenerationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, identity: &Identity) -> Option<CacheEntry> {
        self.get_at(identity, Instant::now())
    }

    fn get_at(&self, identity: &Identity, now: Instant) -> Option<CacheEntry> {
        // Clone out so the shard guard is released before any removal.
        let entry = self.entries.get(identity).map(|entry| entry.clone())?;
        if entry.is_expired(self.ttl, now) {
            debug!(%identity, "cache entry expired");
            self.entries
                .remove_if(identity, |_, entry| entry.is_expired(self.ttl, now));
            return None;
        }
        Some(entry)
    }

    pub fn put(&self, identity: Identity, questions: Arc<[Question]>) {
        self.put_at(identity, questions, Instant::now());
    }

    fn put_at(&self, identity: Identity, questions: Arc<[Question]>, created_at: Instant) {
        self.entries.insert(
            identity,
            CacheEntry {
                questions,
                created_at,
            },
        );
    }

    pub fn invalidate(&self, identity: &Identity) -> bool {
        self.entries.remove(identity).is_some()
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Removes every expired entry and returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.is_expired(self.ttl, now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
