//! Cache Store Module
//!
//! Bounded in-memory cache with TTL expiration, LRU eviction and a memory ceiling.
//! All operations lock the store for their full read-modify-write.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::lru::least_recently_used;
use crate::cache::size::estimate_size;
use crate::cache::{CacheEntry, CacheStats, HitCounters};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;

// == Cache State ==
/// Lock-protected interior of a [`CacheStore`].
#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Sum of `size_bytes` across live entries
    memory_used: usize,
    counters: HitCounters,
    /// Monotonic access counter for LRU ordering
    access_seq: u64,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            memory_used: 0,
            counters: HitCounters::new(),
            access_seq: 0,
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.access_seq += 1;
        self.access_seq
    }

    /// Removes an entry and releases its memory.
    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.memory_used = self.memory_used.saturating_sub(entry.size_bytes);
        Some(entry)
    }
}

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
///
/// Designed to be shared behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct CacheStore<V> {
    state: Mutex<CacheState<V>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl<V> CacheStore<V>
where
    V: Clone + Serialize,
{
    // == Constructor ==
    /// Creates a new CacheStore using the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CacheState::new()),
            config,
            clock,
        }
    }

    /// Returns the configuration the store was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are
    /// removed and counted as misses.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let expired = match state.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                state.counters.record_miss();
                self.log_debug(key, "miss");
                return None;
            }
        };

        if expired {
            state.remove(key);
            state.counters.record_miss();
            state.counters.record_expirations(1);
            self.log_debug(key, "expired");
            return None;
        }

        let seq = state.next_seq();
        let entry = state.entries.get_mut(key)?;
        entry.touch(now, seq);
        state.counters.record_hit();
        self.log_debug(key, "hit");
        Some(entry.value.clone())
    }

    // == Set ==
    /// Stores a value with optional TTL in seconds (`default_ttl_seconds` if None).
    ///
    /// An existing value under the same key is replaced. Least recently used
    /// entries are evicted until both the entry limit and the memory ceiling
    /// leave room. A value whose estimated size alone exceeds the memory
    /// ceiling is rejected without evicting anything else. On rejection, as
    /// with a TTL of zero, any existing value under the key is removed so a
    /// later `get` never returns the value this call replaced.
    ///
    /// Returns true if the value was stored.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<u64>) -> bool {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.config.default_ttl_seconds);
        let size = estimate_size(&value);
        let max_memory = self.config.max_memory_bytes();

        if size > max_memory || self.config.max_entries == 0 {
            warn!(
                key = %key,
                size_bytes = size,
                max_memory_bytes = max_memory,
                "Cache entry rejected: larger than the cache can hold"
            );
            if self.state.lock().remove(&key).is_some() {
                self.log_debug(&key, "dropped stale value");
            }
            return false;
        }

        let now = self.clock.now_ms();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        state.remove(&key);
        if ttl == 0 {
            self.log_debug(&key, "skipped (zero ttl)");
            return false;
        }

        while !state.entries.is_empty()
            && (state.entries.len() >= self.config.max_entries
                || state.memory_used + size > max_memory)
        {
            let Some(victim) = least_recently_used(&state.entries) else {
                break;
            };
            state.remove(&victim);
            state.counters.record_eviction();
            self.log_debug(&victim, "evicted");
        }

        let seq = state.next_seq();
        state
            .entries
            .insert(key.clone(), CacheEntry::new(value, now, ttl, size, seq));
        state.memory_used += size;
        self.log_debug(&key, "set");
        true
    }

    // == Has ==
    /// Returns true if a live entry exists, without touching it or the counters.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.state
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if it existed.
    pub fn del(&self, key: &str) -> bool {
        let removed = self.state.lock().remove(key).is_some();
        if removed {
            self.log_debug(key, "deleted");
        }
        removed
    }

    // == Delete By Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn del_pattern(&self, prefix: &str) -> usize {
        let mut state = self.state.lock();
        let matching: Vec<String> = state
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &matching {
            state.remove(key);
        }

        debug!(prefix, removed = matching.len(), "Cache prefix invalidated");
        matching.len()
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, computing and storing it on a miss.
    ///
    /// The factory only runs when no live value exists. Factory errors are
    /// returned unchanged and nothing is cached. The lock is not held while
    /// the factory runs, so concurrent misses on one key may each compute.
    pub async fn get_or_set<F, Fut, E>(&self, key: &str, factory: F, ttl: Option<u64>) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = factory().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    // == Clear ==
    /// Removes all entries and resets the counters.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        *state = CacheState::new();
        debug!("Cache cleared");
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats::snapshot(
            &state.counters,
            state.entries.len(),
            self.config.max_entries,
            state.memory_used,
            self.config.max_memory_bytes(),
        )
    }

    // == Purge Expired ==
    /// Removes all expired entries regardless of access.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        let expired_keys: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            state.remove(key);
        }
        state.counters.record_expirations(expired_keys.len());

        expired_keys.len()
    }

    // == Keys ==
    /// Returns the keys currently held, expired or not.
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().entries.keys().cloned().collect()
    }

    /// Returns the estimated bytes held by live entries.
    pub fn memory_used_bytes(&self) -> usize {
        self.state.lock().memory_used
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    fn log_debug(&self, key: &str, event: &str) {
        if self.config.debug_logging {
            debug!(key, event, "cache");
        }
    }
}
