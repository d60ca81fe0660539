//! Circuit breaker for dependency protection.
//!
//! # State Transitions
//! ```text
//! Closed → Open: calls >= volume_threshold and failure% >= error_threshold_percentage
//! Open → HalfOpen: reset_timeout_ms after opening
//! HalfOpen → Closed: trial call succeeds (counters reset)
//! HalfOpen → Open: trial call fails (timer rescheduled)
//! ```
//!
//! The reset timer is a one-shot tokio task. The same deadline is also
//! checked against the breaker's [`Clock`] whenever state is observed, so a
//! [`ManualClock`](crate::clock::ManualClock) can move a breaker to half-open
//! without any sleeping.
//!
//! A call that exceeds `timeout_ms` is reported as a timeout but keeps
//! running in the background; its eventual result is discarded.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::breaker::{BreakerOptions, BreakerStats, CircuitState};
use crate::clock::{Clock, SystemClock};
use crate::error::BreakerError;

// == Breaker Core ==
/// Mutable state guarded by the breaker's lock.
#[derive(Debug)]
struct Core {
    state: CircuitState,
    failures: u64,
    successes: u64,
    last_failure_time: Option<u64>,
    last_success_time: Option<u64>,
    /// Set while open: when the breaker opened
    opened_at: Option<u64>,
    /// Bumped on every open/close so a stale timer knows to do nothing
    generation: u64,
    reset_timer: Option<JoinHandle<()>>,
    /// A half-open trial call is in flight
    trial_in_flight: bool,
}

impl Core {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            successes: 0,
            last_failure_time: None,
            last_success_time: None,
            opened_at: None,
            generation: 0,
            reset_timer: None,
            trial_in_flight: false,
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.reset_timer.take() {
            timer.abort();
        }
    }

    fn close(&mut self) {
        self.cancel_timer();
        self.state = CircuitState::Closed;
        self.failures = 0;
        self.successes = 0;
        self.opened_at = None;
        self.trial_in_flight = false;
        self.generation += 1;
    }

    fn half_open(&mut self) {
        self.state = CircuitState::HalfOpen;
        self.opened_at = None;
        self.trial_in_flight = false;
    }

    /// Moves an open breaker to half-open once its reset deadline has passed.
    fn poll_reset(&mut self, now: u64, reset_timeout_ms: u64) -> Option<CircuitState> {
        let opened_at = self.opened_at?;
        if self.state == CircuitState::Open && now >= opened_at.saturating_add(reset_timeout_ms) {
            self.cancel_timer();
            self.half_open();
            Some(CircuitState::HalfOpen)
        } else {
            None
        }
    }

    fn should_trip(&self, options: &BreakerOptions) -> bool {
        let total = self.failures.saturating_add(self.successes);
        total >= u64::from(options.volume_threshold)
            && u128::from(self.failures) * 100
                >= u128::from(options.error_threshold_percentage) * u128::from(total)
    }
}

struct Inner {
    name: String,
    options: BreakerOptions,
    clock: Arc<dyn Clock>,
    core: Mutex<Core>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.core.get_mut().cancel_timer();
    }
}

// == Circuit Breaker ==
/// Per-dependency circuit breaker.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct CircuitBreaker {
    inner: Arc<Inner>,
}

impl CircuitBreaker {
    // == Constructor ==
    pub fn new(name: impl Into<String>, options: BreakerOptions) -> Self {
        Self::with_clock(name, options, Arc::new(SystemClock))
    }

    pub fn with_clock(name: impl Into<String>, options: BreakerOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                options,
                clock,
                core: Mutex::new(Core::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn options(&self) -> &BreakerOptions {
        &self.inner.options
    }

    // == Fire ==
    /// Runs `operation` through the breaker.
    ///
    /// Fails with [`BreakerError::Open`] without calling `operation` while
    /// open, or while half-open with the trial call already taken. Otherwise
    /// the call races `timeout_ms`; losing the race yields
    /// [`BreakerError::Timeout`] and the call is left running detached.
    pub async fn fire<T, E, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let trial = self.acquire()?;
        // Frees the half-open slot if this future is dropped before settling
        let _trial = TrialGuard {
            breaker: self,
            generation: trial,
        };

        let timeout_ms = self.inner.options.timeout_ms;
        let call = tokio::spawn(operation());

        match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
            Ok(Ok(Ok(value))) => {
                self.record_success();
                Ok(value)
            }
            Ok(Ok(Err(err))) => {
                if self.inner.options.counts_as_failure(&err) {
                    self.record_failure();
                }
                Err(BreakerError::Inner(err))
            }
            Ok(Err(join_err)) if join_err.is_panic() => {
                self.record_failure();
                std::panic::resume_unwind(join_err.into_panic())
            }
            Ok(Err(_)) | Err(_) => {
                warn!(
                    breaker = %self.inner.name,
                    timeout_ms,
                    "Circuit breaker call timed out"
                );
                self.record_failure();
                Err(BreakerError::Timeout {
                    name: self.inner.name.clone(),
                    timeout_ms,
                })
            }
        }
    }

    // == State ==
    /// Returns the current state, applying an elapsed reset deadline first.
    pub fn state(&self) -> CircuitState {
        let (state, transition) = {
            let mut core = self.inner.core.lock();
            let transition = self.poll_reset_locked(&mut core);
            (core.state, transition)
        };
        self.emit(transition);
        state
    }

    /// Returns true if a call fired now would be attempted.
    pub fn is_allowing_requests(&self) -> bool {
        let (allowed, transition) = {
            let mut core = self.inner.core.lock();
            let transition = self.poll_reset_locked(&mut core);
            let allowed = match core.state {
                CircuitState::Closed => true,
                CircuitState::HalfOpen => !core.trial_in_flight,
                CircuitState::Open => false,
            };
            (allowed, transition)
        };
        self.emit(transition);
        allowed
    }

    // == Stats ==
    pub fn stats(&self) -> BreakerStats {
        let (stats, transition) = {
            let mut core = self.inner.core.lock();
            let transition = self.poll_reset_locked(&mut core);
            let stats = BreakerStats {
                name: self.inner.name.clone(),
                state: core.state,
                failures: core.failures,
                successes: core.successes,
                last_failure_time: core.last_failure_time,
                last_success_time: core.last_success_time,
            };
            (stats, transition)
        };
        self.emit(transition);
        stats
    }

    // == Reset ==
    /// Forces the breaker closed and zeroes its counters.
    pub fn reset(&self) {
        let was = {
            let mut core = self.inner.core.lock();
            let was = core.state;
            core.close();
            was
        };
        if was != CircuitState::Closed {
            self.emit(Some(CircuitState::Closed));
        }
    }

    /// Claims permission for one call.
    ///
    /// Returns the breaker generation when the call took the half-open trial.
    fn acquire<E>(&self) -> Result<Option<u64>, BreakerError<E>> {
        let (result, transition) = {
            let mut core = self.inner.core.lock();
            let transition = self.poll_reset_locked(&mut core);
            let state = core.state;
            let result = match state {
                CircuitState::Closed => Ok(None),
                CircuitState::HalfOpen if !core.trial_in_flight => {
                    core.trial_in_flight = true;
                    Ok(Some(core.generation))
                }
                CircuitState::HalfOpen | CircuitState::Open => Err(BreakerError::Open {
                    name: self.inner.name.clone(),
                }),
            };
            (result, transition)
        };
        self.emit(transition);

        if result.is_err() {
            debug!(breaker = %self.inner.name, "Circuit breaker rejected call");
        }
        result
    }

    fn record_success(&self) {
        let now = self.inner.clock.now_ms();
        let transition = {
            let mut core = self.inner.core.lock();
            core.successes = core.successes.saturating_add(1);
            core.last_success_time = Some(now);
            if core.state == CircuitState::HalfOpen {
                core.close();
                Some(CircuitState::Closed)
            } else {
                None
            }
        };
        self.emit(transition);
    }

    fn record_failure(&self) {
        let now = self.inner.clock.now_ms();
        let transition = {
            let mut core = self.inner.core.lock();
            core.failures = core.failures.saturating_add(1);
            core.last_failure_time = Some(now);
            let trip = match core.state {
                CircuitState::HalfOpen => true,
                CircuitState::Closed => core.should_trip(&self.inner.options),
                CircuitState::Open => false,
            };
            if trip {
                self.open_locked(&mut core, now);
                Some(CircuitState::Open)
            } else {
                None
            }
        };
        self.emit(transition);
    }

    /// Gives the half-open trial back if no outcome was recorded for it.
    ///
    /// Recording an outcome leaves half-open or bumps the generation, so a
    /// settled trial is a no-op here.
    fn release_trial(&self, generation: u64) {
        let mut core = self.inner.core.lock();
        if core.state == CircuitState::HalfOpen && core.generation == generation {
            core.trial_in_flight = false;
        }
    }

    fn poll_reset_locked(&self, core: &mut Core) -> Option<CircuitState> {
        core.poll_reset(self.inner.clock.now_ms(), self.inner.options.reset_timeout_ms)
    }

    /// Opens the breaker and schedules the half-open transition.
    fn open_locked(&self, core: &mut Core, now: u64) {
        core.cancel_timer();
        core.state = CircuitState::Open;
        core.opened_at = Some(now);
        core.trial_in_flight = false;
        core.generation += 1;

        // Without a runtime the deadline is still honored lazily
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let breaker: Weak<Inner> = Arc::downgrade(&self.inner);
            let generation = core.generation;
            let delay = Duration::from_millis(self.inner.options.reset_timeout_ms);
            core.reset_timer = Some(runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(inner) = breaker.upgrade() {
                    CircuitBreaker { inner }.reset_timer_fired(generation);
                }
            }));
        }
    }

    fn reset_timer_fired(&self, generation: u64) {
        let transition = {
            let mut core = self.inner.core.lock();
            if core.state == CircuitState::Open && core.generation == generation {
                // This task is the timer; detach rather than abort it
                core.reset_timer = None;
                core.half_open();
                Some(CircuitState::HalfOpen)
            } else {
                None
            }
        };
        self.emit(transition);
    }

    /// Logs a transition and runs its hook, outside the lock.
    fn emit(&self, transition: Option<CircuitState>) {
        let Some(state) = transition else {
            return;
        };
        let name = self.inner.name.as_str();
        let options = &self.inner.options;

        let hook = match state {
            CircuitState::Open => {
                warn!(breaker = name, "Circuit breaker opened");
                &options.on_open
            }
            CircuitState::HalfOpen => {
                info!(breaker = name, "Circuit breaker half-open, next call is a trial");
                &options.on_half_open
            }
            CircuitState::Closed => {
                info!(breaker = name, "Circuit breaker closed");
                &options.on_close
            }
        };

        if let Some(hook) = hook {
            hook(name);
        }
    }
}

/// Releases an unsettled half-open trial when `fire` finishes or is dropped.
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    generation: Option<u64>,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if let Some(generation) = self.generation {
            self.breaker.release_trial(generation);
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.inner.name)
            .field("state", &self.inner.core.lock().state)
            .field("options", &self.inner.options)
            .finish()
    }
}
