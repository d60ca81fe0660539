//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::breaker::{BreakerStats, CircuitState};

/// Response body for cache invalidation (DELETE /cache?prefix=...)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// The prefix that was invalidated
    pub prefix: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(prefix: impl Into<String>, removed: usize) -> Self {
        Self {
            prefix: prefix.into(),
            removed,
        }
    }
}

/// Response body for the breaker listing (GET /breakers)
#[derive(Debug, Clone, Serialize)]
pub struct BreakerListResponse {
    /// Number of breakers currently open
    pub open: usize,
    pub breakers: Vec<BreakerStats>,
}

impl BreakerListResponse {
    pub fn new(breakers: Vec<BreakerStats>) -> Self {
        let open = breakers
            .iter()
            .filter(|stats| stats.state == CircuitState::Open)
            .count();
        Self { open, breakers }
    }
}

/// Response body for POST /breakers/reset
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    /// Success message
    pub message: String,
    /// Number of breakers reset
    pub count: usize,
}

impl ResetResponse {
    pub fn new(count: usize) -> Self {
        Self {
            message: format!("{} circuit breaker(s) reset", count),
            count,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy", or "degraded" while any breaker is open
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a HealthResponse with the current timestamp
    pub fn from_open_breakers(open_breakers: usize) -> Self {
        let status = if open_breakers == 0 { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
