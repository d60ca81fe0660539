//! Pre-configured retrying wrapper around an async function.

use std::fmt::Display;
use std::future::Future;

use crate::retry::{with_retry, RetryOptions};

/// An operation bundled with the retry options it always runs under.
pub struct Retryable<F, E> {
    operation: F,
    options: RetryOptions<E>,
}

impl<F, E> Retryable<F, E> {
    /// Runs the operation through [`with_retry`].
    pub async fn call<T, Fut>(&self) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display + 'static,
    {
        with_retry(&self.operation, &self.options).await
    }

    pub fn options(&self) -> &RetryOptions<E> {
        &self.options
    }
}

/// Wraps `operation` so every call retries with `options`.
pub fn create_retryable<F, E>(operation: F, options: RetryOptions<E>) -> Retryable<F, E> {
    Retryable { operation, options }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPreset;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_retryable_reuses_options_per_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let fetch_vendor = create_retryable(
            move || {
                let counter = counter.clone();
                async move {
                    // Every other call fails once
                    if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                        Err("HTTP 502".to_string())
                    } else {
                        Ok("vendor")
                    }
                }
            },
            RetryOptions::preset(RetryPreset::Fast),
        );

        assert_eq!(fetch_vendor.call().await, Ok("vendor"));
        assert_eq!(fetch_vendor.call().await, Ok("vendor"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(fetch_vendor.options().max_retries, 2);
    }
}
