//! API Module
//!
//! HTTP handlers and routing for the diagnostics surface.
//!
//! # Endpoints
//! - `GET /health` - Liveness plus open-breaker summary
//! - `GET /stats/cache` - Cache statistics
//! - `DELETE /cache?prefix=` - Invalidate keys by prefix
//! - `GET /breakers` - Stats for every circuit breaker
//! - `GET /breakers/:name` - Stats for one circuit breaker
//! - `POST /breakers/reset` - Force every breaker closed

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
