//! API Handlers
//!
//! HTTP request handlers for the diagnostics endpoints. Handlers only read
//! or reset shared state; no endpoint stores values.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::breaker::{BreakerOptions, BreakerStats, CircuitBreakerRegistry};
use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    BreakerListResponse, HealthResponse, InvalidateQuery, InvalidateResponse, ResetResponse,
};

/// Application state shared across all handlers.
///
/// Both members are internally synchronized, so handlers never take an
/// outer lock.
#[derive(Clone)]
pub struct AppState {
    /// Shared response cache
    pub cache: Arc<CacheStore<Value>>,
    /// Breakers guarding downstream dependencies
    pub breakers: Arc<CircuitBreakerRegistry>,
}

impl AppState {
    /// Creates a new AppState from already-built components.
    pub fn new(cache: Arc<CacheStore<Value>>, breakers: Arc<CircuitBreakerRegistry>) -> Self {
        Self { cache, breakers }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Breakers listed in `config.breakers` are registered with default
    /// options. Callers guarding other dependencies register them through
    /// `breakers.get_or_create`, after which they show up in the endpoints.
    pub fn from_config(config: &Config) -> Self {
        let breakers = CircuitBreakerRegistry::new();
        for name in &config.breakers {
            breakers.get_or_create(name, BreakerOptions::default());
        }
        Self::new(Arc::new(CacheStore::new(config.cache.clone())), Arc::new(breakers))
    }

    fn open_breakers(&self) -> usize {
        BreakerListResponse::new(self.breakers.get_all_stats()).open
    }
}

/// Handler for GET /health
///
/// Reports "degraded" while any breaker is open.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_open_breakers(state.open_breakers()))
}

/// Handler for GET /stats/cache
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// Handler for DELETE /cache?prefix=...
///
/// Removes every key starting with the prefix.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let removed = state.cache.del_pattern(&query.prefix);
    info!(prefix = %query.prefix, removed, "Cache invalidated");

    Ok(Json(InvalidateResponse::new(query.prefix, removed)))
}

/// Handler for GET /breakers
pub async fn list_breakers_handler(State(state): State<AppState>) -> Json<BreakerListResponse> {
    Json(BreakerListResponse::new(state.breakers.get_all_stats()))
}

/// Handler for GET /breakers/:name
pub async fn breaker_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BreakerStats>> {
    state
        .breakers
        .get(&name)
        .map(|breaker| Json(breaker.stats()))
        .ok_or_else(|| ApiError::NotFound(format!("circuit breaker '{}'", name)))
}

/// Handler for POST /breakers/reset
pub async fn reset_breakers_handler(State(state): State<AppState>) -> Json<ResetResponse> {
    state.breakers.reset_all();
    Json(ResetResponse::new(state.breakers.len()))
}
