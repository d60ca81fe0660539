//! Memoized Functions
//!
//! Wraps an async function so its results are cached under a key derived
//! from a prefix and the JSON form of its argument.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::cache::CacheStore;

// == Memoized ==
/// An async function whose results go through [`CacheStore::get_or_set`].
///
/// # Example
/// ```ignore
/// let controls = Memoized::new(cache.clone(), "controls", Some(60), |org_id: u64| async move {
///     load_controls(org_id).await
/// });
/// let list = controls.call(42).await?;
/// ```
pub struct Memoized<V, F> {
    cache: Arc<CacheStore<V>>,
    prefix: String,
    ttl: Option<u64>,
    func: F,
}

impl<V, F> Memoized<V, F>
where
    V: Clone + Serialize,
{
    pub fn new(cache: Arc<CacheStore<V>>, prefix: impl Into<String>, ttl: Option<u64>, func: F) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
            func,
        }
    }

    /// Returns the cached result for `args`, calling the function on a miss.
    ///
    /// Arguments that cannot be serialized bypass the cache.
    pub async fn call<A, Fut, E>(&self, args: A) -> Result<V, E>
    where
        A: Serialize,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        match memo_key(&self.prefix, &args) {
            Some(key) => {
                self.cache
                    .get_or_set(&key, || (self.func)(args), self.ttl)
                    .await
            }
            None => {
                debug!(prefix = %self.prefix, "Memoized call bypassing cache: unserializable arguments");
                (self.func)(args).await
            }
        }
    }

    /// Drops every cached result of this function.
    pub fn invalidate(&self) -> usize {
        self.cache.del_pattern(&format!("{}:", self.prefix))
    }
}

/// Builds the cache key for a memoized call.
pub fn memo_key<A: Serialize + ?Sized>(prefix: &str, args: &A) -> Option<String> {
    serde_json::to_string(args)
        .ok()
        .map(|json| format!("{prefix}:{json}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_memo_key() {
        assert_eq!(memo_key("controls", &42), Some("controls:42".to_string()));
        assert_eq!(
            memo_key("evidence", &("org", 7)),
            Some("evidence:[\"org\",7]".to_string())
        );
    }

    #[tokio::test]
    async fn test_memoized_calls_once_per_argument() {
        let cache = Arc::new(CacheStore::new(CacheConfig::default()));
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let doubled = Memoized::new(cache.clone(), "double", None, move |n: u64| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(n * 2)
        });

        assert_eq!(doubled.call(2).await.unwrap(), 4);
        assert_eq!(doubled.call(2).await.unwrap(), 4);
        assert_eq!(doubled.call(3).await.unwrap(), 6);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        assert_eq!(doubled.invalidate(), 2);
        assert_eq!(doubled.call(2).await.unwrap(), 4);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
