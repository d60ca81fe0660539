//! Request DTOs for the diagnostics API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

/// Query for cache invalidation (DELETE /cache?prefix=...)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateQuery {
    /// Key prefix to invalidate
    pub prefix: String,
}

impl InvalidateQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    /// An empty prefix would match every key; use a dedicated clear instead.
    pub fn validate(&self) -> Option<String> {
        if self.prefix.is_empty() {
            return Some("Prefix cannot be empty".to_string());
        }
        None
    }
}
