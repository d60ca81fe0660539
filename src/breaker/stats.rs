//! Circuit breaker statistics snapshot.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::breaker::CircuitState;

/// Point-in-time view of one circuit breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerStats {
    pub name: String,
    pub state: CircuitState,
    /// Failures since the breaker last closed
    pub failures: u64,
    /// Successes since the breaker last closed
    pub successes: u64,
    /// Unix milliseconds of the most recent failure
    pub last_failure_time: Option<u64>,
    /// Unix milliseconds of the most recent success
    pub last_success_time: Option<u64>,
}

impl BreakerStats {
    /// Failure share of the calls counted since the last close, 0-100.
    pub fn failure_percentage(&self) -> f64 {
        let total = self.failures.saturating_add(self.successes);
        if total == 0 {
            0.0
        } else {
            self.failures as f64 * 100.0 / total as f64
        }
    }

    pub fn last_failure_at(&self) -> Option<DateTime<Utc>> {
        self.last_failure_time.and_then(to_datetime)
    }

    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.last_success_time.and_then(to_datetime)
    }
}

fn to_datetime(ms: u64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(i64::try_from(ms).ok()?).single()
}
