//! Circuit breaker configuration.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Decides whether an error returned by the wrapped call counts as a failure.
///
/// Receives the error type-erased; see [`BreakerOptions::with_failure_filter`]
/// for the typed form.
pub type FailurePredicate = Arc<dyn Fn(&(dyn Any + Send)) -> bool + Send + Sync>;

/// Lifecycle hook, called with the breaker's name.
pub type StateCallback = Arc<dyn Fn(&str) + Send + Sync>;

// == Breaker Options ==
/// Thresholds, timeouts and hooks for one circuit breaker.
#[derive(Clone)]
pub struct BreakerOptions {
    /// Time a call may take before it is declared failed
    pub timeout_ms: u64,
    /// Failure percentage (0-100) at or above which the breaker opens
    pub error_threshold_percentage: u32,
    /// Time spent open before a trial call is allowed
    pub reset_timeout_ms: u64,
    /// Calls observed since the last close before the percentage is evaluated
    pub volume_threshold: u32,
    pub(crate) is_failure: Option<FailurePredicate>,
    pub(crate) on_open: Option<StateCallback>,
    pub(crate) on_close: Option<StateCallback>,
    pub(crate) on_half_open: Option<StateCallback>,
}

impl Default for BreakerOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            error_threshold_percentage: 50,
            reset_timeout_ms: 30_000,
            volume_threshold: 5,
            is_failure: None,
            on_open: None,
            on_close: None,
            on_half_open: None,
        }
    }
}

impl BreakerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_error_threshold_percentage(mut self, percentage: u32) -> Self {
        self.error_threshold_percentage = percentage.min(100);
        self
    }

    pub fn with_reset_timeout_ms(mut self, reset_timeout_ms: u64) -> Self {
        self.reset_timeout_ms = reset_timeout_ms;
        self
    }

    pub fn with_volume_threshold(mut self, volume_threshold: u32) -> Self {
        self.volume_threshold = volume_threshold;
        self
    }

    /// Only errors of type `E` for which `filter` returns true count as failures.
    ///
    /// Errors of any other type keep counting as failures.
    pub fn with_failure_filter<E, F>(mut self, filter: F) -> Self
    where
        E: 'static,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.is_failure = Some(Arc::new(move |err: &(dyn Any + Send)| {
            err.downcast_ref::<E>().map_or(true, &filter)
        }));
        self
    }

    pub fn on_open(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(callback));
        self
    }

    pub fn on_close(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(callback));
        self
    }

    pub fn on_half_open(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_half_open = Some(Arc::new(callback));
        self
    }

    /// Applies the failure predicate; every error counts when none is set.
    pub(crate) fn counts_as_failure(&self, err: &(dyn Any + Send)) -> bool {
        self.is_failure.as_ref().map_or(true, |predicate| predicate(err))
    }
}

impl fmt::Debug for BreakerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakerOptions")
            .field("timeout_ms", &self.timeout_ms)
            .field("error_threshold_percentage", &self.error_threshold_percentage)
            .field("reset_timeout_ms", &self.reset_timeout_ms)
            .field("volume_threshold", &self.volume_threshold)
            .field("is_failure", &self.is_failure.is_some())
            .finish_non_exhaustive()
    }
}
