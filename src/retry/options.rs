//! Retry configuration and named presets.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Decides whether a failed attempt may be retried.
///
/// Called with the error and the zero-based index of the attempt that failed.
pub type RetryPredicate<E> = Arc<dyn Fn(&E, u32) -> bool + Send + Sync>;

/// Called before each retry with the error, the one-based retry number and
/// the delay in milliseconds about to be slept.
pub type RetryCallback<E> = Arc<dyn Fn(&E, u32, u64) + Send + Sync>;

// == Retry Preset ==
/// Named retry profiles. Pure data: they only differ in counts and delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryPreset {
    /// Interactive paths: give up quickly
    Fast,
    Standard,
    /// Background collectors that can afford to wait
    Aggressive,
    /// Short waits for lock or connection-pool contention
    Database,
    /// A single attempt
    None,
}

// == Retry Options ==
/// How many times to retry and how long to wait between attempts.
pub struct RetryOptions<E> {
    /// Retries after the first attempt; total attempts are `max_retries + 1`
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each one after
    pub base_delay_ms: u64,
    /// Upper bound on the doubled delay, before jitter
    pub max_delay_ms: u64,
    /// Extra random share of the delay, 0.0 to 1.0
    pub jitter: f64,
    /// Label used in log events
    pub operation_name: Option<String>,
    pub(crate) is_retryable: Option<RetryPredicate<E>>,
    pub(crate) on_retry: Option<RetryCallback<E>>,
}

impl<E> RetryOptions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds options from a named preset.
    pub fn preset(preset: RetryPreset) -> Self {
        let (max_retries, base_delay_ms, max_delay_ms, jitter) = match preset {
            RetryPreset::Fast => (2, 100, 1_000, 0.1),
            RetryPreset::Standard => (3, 1_000, 10_000, 0.2),
            RetryPreset::Aggressive => (5, 500, 30_000, 0.3),
            RetryPreset::Database => (3, 200, 5_000, 0.1),
            RetryPreset::None => (0, 0, 0, 0.0),
        };
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            jitter,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Replaces the default transient-error classification.
    pub fn retry_if(mut self, predicate: impl Fn(&E, u32) -> bool + Send + Sync + 'static) -> Self {
        self.is_retryable = Some(Arc::new(predicate));
        self
    }

    pub fn on_retry(mut self, callback: impl Fn(&E, u32, u64) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    pub(crate) fn label(&self) -> &str {
        self.operation_name.as_deref().unwrap_or("operation")
    }
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter: 0.1,
            operation_name: None,
            is_retryable: None,
            on_retry: None,
        }
    }
}

impl<E> Clone for RetryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            base_delay_ms: self.base_delay_ms,
            max_delay_ms: self.max_delay_ms,
            jitter: self.jitter,
            operation_name: self.operation_name.clone(),
            is_retryable: self.is_retryable.clone(),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .field("jitter", &self.jitter)
            .field("operation_name", &self.operation_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options: RetryOptions<String> = RetryOptions::default();
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.base_delay_ms, 1_000);
        assert_eq!(options.max_delay_ms, 30_000);
        assert_eq!(options.jitter, 0.1);
        assert_eq!(options.label(), "operation");
    }

    #[test]
    fn test_presets_differ_only_in_timing() {
        let fast: RetryOptions<String> = RetryOptions::preset(RetryPreset::Fast);
        assert_eq!((fast.max_retries, fast.base_delay_ms, fast.max_delay_ms), (2, 100, 1_000));

        let none: RetryOptions<String> = RetryOptions::preset(RetryPreset::None);
        assert_eq!(none.max_retries, 0);
        assert!(none.is_retryable.is_none());
        assert!(none.on_retry.is_none());

        let aggressive: RetryOptions<String> = RetryOptions::preset(RetryPreset::Aggressive);
        assert!(aggressive.max_retries > fast.max_retries);
    }

    #[test]
    fn test_jitter_clamped() {
        let options: RetryOptions<String> = RetryOptions::new().with_jitter(4.0);
        assert_eq!(options.jitter, 1.0);
    }
}
