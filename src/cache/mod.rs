//! Cache Module
//!
//! Provides a bounded in-memory cache with TTL expiration, LRU eviction and
//! an estimated memory ceiling.

mod entry;
mod lru;
mod memoize;
mod size;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use memoize::{memo_key, Memoized};
pub use size::{estimate_size, FALLBACK_SIZE_BYTES};
pub use stats::{CacheStats, HitCounters};
pub use store::CacheStore;
