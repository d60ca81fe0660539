//! Circuit Breaker Module
//!
//! Per-dependency breakers that stop calling a failing dependency once its
//! failure rate crosses a threshold, then probe for recovery.
//!
//! # States
//! - Closed: calls pass through
//! - Open: calls fail fast with [`BreakerError::Open`](crate::error::BreakerError::Open)
//! - Half-Open: one trial call decides between Closed and Open

mod circuit;
mod options;
mod registry;
mod state;
mod stats;

pub use circuit::CircuitBreaker;
pub use options::{BreakerOptions, FailurePredicate, StateCallback};
pub use registry::CircuitBreakerRegistry;
pub use state::CircuitState;
pub use stats::BreakerStats;
