//! Resilience Kit - caching, circuit breaking and retries for async services
//!
//! Provides an in-process TTL/LRU cache with a memory ceiling, circuit
//! breakers with a keyed registry, and retry-with-backoff helpers, plus a
//! small HTTP surface for inspecting them.

pub mod api;
pub mod breaker;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod tasks;

pub use api::AppState;
pub use breaker::{BreakerOptions, CircuitBreaker, CircuitBreakerRegistry, CircuitState};
pub use cache::{CacheStore, Memoized};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, Config};
pub use error::BreakerError;
pub use retry::{with_retry, with_retry_result, RetryOptions, RetryPreset};
pub use tasks::spawn_sweep_task;
