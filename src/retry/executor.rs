//! Retry loop.
//!
//! Runs an async operation up to `max_retries + 1` times, sleeping with
//! exponential backoff between attempts. The caller's error is never
//! wrapped: exhaustion and non-retryable failures return it unchanged.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::retry::backoff::calculate_backoff;
use crate::retry::classify::is_transient_error;
use crate::retry::RetryOptions;

// == Retry Result ==
/// Structured outcome of [`with_retry_result`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryResult<T, E> {
    /// The final attempt's value or error
    pub result: Result<T, E>,
    /// Attempts made, including the first
    pub attempts: u32,
    /// Wall time spent across attempts and sleeps
    pub total_time_ms: u64,
}

impl<T, E> RetryResult<T, E> {
    pub fn success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&E> {
        self.result.as_ref().err()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

// == With Retry ==
/// Runs `operation`, retrying retryable failures with backoff.
///
/// Returns the first success, or the last error once retries are exhausted
/// or an error is classified as non-retryable.
pub async fn with_retry<T, E, F, Fut>(operation: F, options: &RetryOptions<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + 'static,
{
    run(operation, options).await.0
}

// == With Retry Result ==
/// Same loop as [`with_retry`], reporting attempts and elapsed time instead
/// of only the outcome.
pub async fn with_retry_result<T, E, F, Fut>(operation: F, options: &RetryOptions<E>) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + 'static,
{
    let started = Instant::now();
    let (result, attempts) = run(operation, options).await;
    RetryResult {
        result,
        attempts,
        total_time_ms: started.elapsed().as_millis() as u64,
    }
}

/// Shared loop; returns the outcome and the number of attempts made.
async fn run<T, E, F, Fut>(mut operation: F, options: &RetryOptions<E>) -> (Result<T, E>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + 'static,
{
    let operation_name = options.label();
    let mut attempt: u32 = 0;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation = operation_name, attempts = attempt + 1, "Succeeded after retry");
                }
                return (Ok(value), attempt + 1);
            }
            Err(err) => err,
        };

        if attempt >= options.max_retries {
            if options.max_retries > 0 {
                error!(
                    operation = operation_name,
                    attempts = attempt + 1,
                    error = %err,
                    "Retries exhausted"
                );
            }
            return (Err(err), attempt + 1);
        }

        let retryable = match &options.is_retryable {
            Some(predicate) => predicate(&err, attempt),
            None => is_transient_error(&err),
        };
        if !retryable {
            debug!(operation = operation_name, error = %err, "Error is not retryable");
            return (Err(err), attempt + 1);
        }

        let delay_ms = calculate_backoff(
            attempt,
            options.base_delay_ms,
            options.max_delay_ms,
            options.jitter,
        );
        warn!(
            operation = operation_name,
            attempt = attempt + 1,
            max_retries = options.max_retries,
            delay_ms,
            error = %err,
            "Attempt failed, retrying"
        );
        if let Some(on_retry) = &options.on_retry {
            on_retry(&err, attempt + 1, delay_ms);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
