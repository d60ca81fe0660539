//! LRU Selection Module
//!
//! Picks the eviction victim by scanning entries for the oldest access.
//! The scan is O(n), bounded by the store's `max_entries`.

use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Least Recently Used ==
/// Returns the key of the least recently accessed entry.
///
/// Entries are ordered by `last_accessed_at`, then by `access_seq` so two
/// entries touched within the same millisecond still have a strict order.
/// Returns None if there are no entries.
pub fn least_recently_used<V>(entries: &HashMap<String, CacheEntry<V>>) -> Option<String> {
    entries
        .iter()
        .min_by_key(|(_, entry)| (entry.last_accessed_at, entry.access_seq))
        .map(|(key, _)| key.clone())
}
