//! Retry Module
//!
//! Bounded retries with exponential backoff and jitter around async operations.
//!
//! # Data Flow
//! ```text
//! attempt fails
//!     → exhausted?          return the error unchanged
//!     → not retryable?      return the error unchanged
//!     → delay = min(base * 2^attempt, max) + jitter
//!     → on_retry(err, attempt + 1, delay), sleep, try again
//! ```

mod backoff;
mod classify;
mod executor;
mod options;
mod retryable;

pub use backoff::{apply_jitter, calculate_backoff, exponential_delay_ms};
pub use classify::is_transient_error;
pub use executor::{with_retry, with_retry_result, RetryResult};
pub use options::{RetryCallback, RetryOptions, RetryPredicate, RetryPreset};
pub use retryable::{create_retryable, Retryable};
