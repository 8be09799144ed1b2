//! Process-local cache of annotated feeds.
//!
//! Entries are keyed by the full `FeedRequest` (filter, sort, viewer) and
//! expire after a TTL. Any toggle or new post clears the whole map, since a
//! single interaction changes counts in every feed that shows the post.
//!
//! A load reads `generation()` before it starts and passes it back to
//! `insert`; an invalidation in between bumps the generation and the stale
//! result is dropped instead of cached. The generation is compared while the
//! entry's shard is write-locked, so `clear()` either runs before the check
//! (and the insert is refused) or waits for the write and removes it.
//!
//! The map holds at most `max_entries` feeds. Reaching the limit sweeps
//! expired entries first, then evicts a tenth of the rest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::domain::{AnnotatedPost, FeedRequest};

#[derive(Debug, Clone)]
struct CachedEntry {
    posts: Arc<Vec<AnnotatedPost>>,
    expires_at: Instant,
}

impl CachedEntry {
    #[inline]
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

pub struct FeedCache {
    store: DashMap<FeedRequest, CachedEntry>,
    ttl: Duration,
    max_entries: usize,
    generation: AtomicU64,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
            generation: AtomicU64::new(0),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Current invalidation generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn get(&self, request: &FeedRequest) -> Option<Arc<Vec<AnnotatedPost>>> {
        let entry = self.store.get(request)?;
        if entry.is_expired() {
            drop(entry);
            self.store.remove(request);
            debug!(filter = request.filter.label(), "Feed cache entry expired");
            return None;
        }
        Some(entry.posts.clone())
    }

    /// Store a feed computed while `generation` was current.
    ///
    /// Returns `false` (and stores nothing) when an invalidation happened
    /// after the load started.
    pub fn insert(
        &self,
        request: FeedRequest,
        generation: u64,
        posts: Arc<Vec<AnnotatedPost>>,
    ) -> bool {
        self.enforce_limits();

        // Holds the shard write lock until the entry is written or dropped
        let slot = self.store.entry(request);
        if generation != self.generation() {
            debug!(
                filter = request.filter.label(),
                "Dropping feed computed before the last invalidation"
            );
            return false;
        }

        slot.insert(CachedEntry {
            posts,
            expires_at: Instant::now() + self.ttl,
        });
        true
    }

    /// Make room for one more entry
    fn enforce_limits(&self) {
        if self.store.len() < self.max_entries {
            return;
        }

        self.store.retain(|_, entry| !entry.is_expired());
        let len = self.store.len();
        if len < self.max_entries {
            debug!(remaining = len, "Feed cache swept expired entries");
            return;
        }

        let evict_count = (len / 10).max(1);
        warn!(
            current_entries = len,
            evict_count, "Feed cache limit reached, evicting entries"
        );

        let keys: Vec<FeedRequest> = self
            .store
            .iter()
            .take(evict_count)
            .map(|entry| *entry.key())
            .collect();
        for key in keys {
            self.store.remove(&key);
        }
    }

    /// Drop every entry and advance the generation
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.store.clear();
        debug!("Feed cache invalidated");
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
