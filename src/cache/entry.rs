//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access tracking.

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Last successful read or write (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Store-wide access sequence number, breaks ties between equal timestamps
    pub access_seq: u64,
    /// Estimated size of the value in bytes
    pub size_bytes: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now` - Current time in Unix milliseconds
    /// * `ttl_seconds` - Lifetime of the entry, must be non-zero
    /// * `size_bytes` - Estimated size of `value`
    /// * `access_seq` - Sequence number for LRU ordering
    pub fn new(value: V, now: u64, ttl_seconds: u64, size_bytes: usize, access_seq: u64) -> Self {
        Self {
            value,
            expires_at: now.saturating_add(ttl_seconds.saturating_mul(1000)),
            last_accessed_at: now,
            access_seq,
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry stays readable up to and including its expiration instant;
    /// it is expired once `now` is strictly past `expires_at`.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }

    // == Touch ==
    /// Records a successful access for LRU purposes.
    pub fn touch(&mut self, now: u64, access_seq: u64) {
        self.last_accessed_at = now;
        self.access_seq = access_seq;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}
