//! Keyed lookup over circuit breakers.
//!
//! One registry is built per process (or per test) and passed to whatever
//! needs breakers; there is no global instance.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::breaker::{BreakerOptions, BreakerStats, CircuitBreaker};
use crate::clock::{Clock, SystemClock};

/// Circuit breakers indexed by dependency name.
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    breakers: RwLock<HashMap<String, CircuitBreaker>>,
    clock: Arc<dyn Clock>,
}

impl CircuitBreakerRegistry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a registry whose breakers read time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            breakers: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the breaker registered under `name`, creating it on first use.
    ///
    /// `options` only apply when the breaker is created; later calls with the
    /// same name get the existing breaker unchanged.
    pub fn get_or_create(&self, name: &str, options: BreakerOptions) -> CircuitBreaker {
        if let Some(breaker) = self.breakers.read().get(name) {
            return breaker.clone();
        }

        self.breakers
            .write()
            .entry(name.to_string())
            .or_insert_with(|| {
                info!(breaker = name, "Circuit breaker registered");
                CircuitBreaker::with_clock(name, options, self.clock.clone())
            })
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<CircuitBreaker> {
        self.breakers.read().get(name).cloned()
    }

    /// Returns the stats of every breaker, ordered by name.
    pub fn get_all_stats(&self) -> Vec<BreakerStats> {
        let breakers: Vec<CircuitBreaker> = self.breakers.read().values().cloned().collect();
        let mut stats: Vec<BreakerStats> = breakers.iter().map(CircuitBreaker::stats).collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    /// Forces every breaker closed.
    pub fn reset_all(&self) {
        let breakers: Vec<CircuitBreaker> = self.breakers.read().values().cloned().collect();
        for breaker in &breakers {
            breaker.reset();
        }
        info!(count = breakers.len(), "All circuit breakers reset");
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.breakers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.read().is_empty()
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
