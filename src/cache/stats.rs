//! Cache Statistics Module
//!
//! Tracks cache performance counters and builds the public stats snapshot.

use serde::Serialize;

// == Hit Counters ==
/// Running counters owned by the cache store.
#[derive(Debug, Clone, Default)]
pub struct HitCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted to make room
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
}

impl HitCounters {
    // == Constructor ==
    /// Creates counters with all values at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

// == Cache Stats ==
/// Point-in-time view of a cache store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Current number of entries
    pub size: usize,
    /// Configured maximum number of entries
    pub max_size: usize,
    /// Estimated memory held by live entries, in megabytes
    #[serde(rename = "memoryUsedMB")]
    pub memory_used_mb: f64,
    /// Configured memory ceiling, in megabytes
    #[serde(rename = "maxMemoryMB")]
    pub max_memory_mb: f64,
    /// hits / (hits + misses), 0.0 before any read
    pub hit_rate: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    /// Builds a snapshot from the store's counters and sizes.
    pub fn snapshot(
        counters: &HitCounters,
        size: usize,
        max_size: usize,
        memory_used_bytes: usize,
        max_memory_bytes: usize,
    ) -> Self {
        Self {
            size,
            max_size,
            memory_used_mb: bytes_to_mb(memory_used_bytes),
            max_memory_mb: bytes_to_mb(max_memory_bytes),
            hit_rate: counters.hit_rate(),
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            expirations: counters.expirations,
        }
    }
}

/// Converts bytes to megabytes rounded to two decimals.
fn bytes_to_mb(bytes: usize) -> f64 {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    (mb * 100.0).round() / 100.0
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_new() {
        let counters = HitCounters::new();
        assert_eq!(counters.hits, 0);
        assert_eq!(counters.misses, 0);
        assert_eq!(counters.evictions, 0);
        assert_eq!(counters.expirations, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(HitCounters::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut counters = HitCounters::new();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        assert_eq!(counters.hit_rate(), 0.75);
    }

    #[test]
    fn test_snapshot_converts_memory() {
        let mut counters = HitCounters::new();
        counters.record_eviction();
        counters.record_expirations(2);

        let stats = CacheStats::snapshot(&counters, 3, 10, 1024 * 1024 + 5_000, 50 * 1024 * 1024);
        assert_eq!(stats.size, 3);
        assert_eq!(stats.max_size, 10);
        assert_eq!(stats.memory_used_mb, 1.0);
        assert_eq!(stats.max_memory_mb, 50.0);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 2);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let stats = CacheStats::snapshot(&HitCounters::new(), 0, 10, 0, 1024 * 1024);
        let json = serde_json::to_value(&stats).unwrap();

        assert!(json.get("maxSize").is_some());
        assert!(json.get("memoryUsedMB").is_some());
        assert!(json.get("maxMemoryMB").is_some());
        assert!(json.get("hitRate").is_some());
    }
}
