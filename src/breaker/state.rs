//! Circuit states.

use std::fmt;

use serde::Serialize;

/// State of a circuit breaker.
///
/// Transitions only run Closed → Open → HalfOpen → (Closed | Open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation - calls pass through
    Closed,
    /// Failing fast - calls are rejected without being made
    Open,
    /// Probing - the next call is let through as a trial
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        };
        f.write_str(label)
    }
}
