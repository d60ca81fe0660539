//! Configuration Module
//!
//! Cache settings and the diagnostics server configuration loaded from
//! environment variables.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Cache Config ==
/// Limits and defaults for a [`CacheStore`](crate::cache::CacheStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL in seconds for entries stored without an explicit TTL
    pub default_ttl_seconds: u64,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Memory ceiling in megabytes (estimated, not byte-exact)
    pub max_memory_mb: usize,
    /// Emit a debug event for every hit, miss, set and eviction
    pub debug_logging: bool,
}

impl CacheConfig {
    /// Memory ceiling in bytes.
    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 300,
            max_entries: 1000,
            max_memory_mb: 100,
            debug_logging: false,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings for the shared cache store
    pub cache: CacheConfig,
    /// HTTP port for the diagnostics endpoints
    pub server_port: u16,
    /// Interval in seconds between expiry sweeps
    pub sweep_interval: u64,
    /// Dependencies whose breakers are registered at startup
    pub breakers: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_MAX_MEMORY_MB` - Memory ceiling in MB (default: 100)
    /// - `CACHE_DEBUG` - `true`/`1` enables per-key debug logging (default: false)
    /// - `CACHE_SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CIRCUIT_BREAKERS` - Comma-separated dependency names to register
    ///   breakers for at startup (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache: CacheConfig {
                default_ttl_seconds: env_or("CACHE_DEFAULT_TTL", defaults.cache.default_ttl_seconds),
                max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache.max_entries),
                max_memory_mb: env_or("CACHE_MAX_MEMORY_MB", defaults.cache.max_memory_mb),
                debug_logging: env::var("CACHE_DEBUG")
                    .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(defaults.cache.debug_logging),
            },
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.sweep_interval),
            breakers: env::var("CIRCUIT_BREAKERS")
                .map(|v| parse_names(&v))
                .unwrap_or(defaults.breakers),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            sweep_interval: 60,
            breakers: Vec::new(),
        }
    }
}

/// Parses an environment variable, falling back when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated list, dropping blanks and duplicates.
fn parse_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.cache.default_ttl_seconds, 300);
        assert_eq!(config.cache.max_memory_mb, 100);
        assert!(!config.cache.debug_logging);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.sweep_interval, 60);
        assert!(config.breakers.is_empty());
    }

    #[test]
    fn test_parse_breaker_names() {
        assert_eq!(
            parse_names(" vendor-api, evidence-store,,vendor-api "),
            vec!["vendor-api".to_string(), "evidence-store".to_string()]
        );
        assert!(parse_names(" , ").is_empty());
    }

    #[test]
    fn test_max_memory_bytes() {
        let cache = CacheConfig {
            max_memory_mb: 2,
            ..CacheConfig::default()
        };
        assert_eq!(cache.max_memory_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("RESILIENCE_KIT_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("RESILIENCE_KIT_TEST_GARBAGE", 42u64), 42);
        env::remove_var("RESILIENCE_KIT_TEST_GARBAGE");
    }

    #[test]
    fn test_env_or_parses_value() {
        env::set_var("RESILIENCE_KIT_TEST_PORT", "8081");
        assert_eq!(env_or("RESILIENCE_KIT_TEST_PORT", 3000u16), 8081);
        env::remove_var("RESILIENCE_KIT_TEST_PORT");
    }
}
