//! Circuit breaker for the external AI call
//!
//! Prevents repeated calls to a known-unhealthy dependency by failing fast
//! once a failure threshold is reached, then probing cautiously after a
//! cooldown. The breaker performs at most one attempt per `execute` call and
//! never retries internally; retry policy belongs to the caller.
//!
//! The breaker is an explicitly owned component injected via `AppState`, not
//! a module-level singleton. Time is read through the [`Clock`] trait so
//! tests can drive state transitions with a manual clock.

use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Time source abstraction
///
/// Production code uses [`SystemClock`]; tests inject a manually advanced
/// clock to exercise cooldown transitions without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock used in production
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Breaker state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, calls pass through
    Closed,
    /// Dependency is failing, calls are rejected until the cooldown elapses
    Open,
    /// Cooldown elapsed, exactly one trial call probes for recovery
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Error returned by [`CircuitBreaker::execute`]
#[derive(Debug, Error)]
pub enum BreakerError<E>
where
    E: std::error::Error,
{
    /// The circuit is open and the cooldown has not elapsed; the operation
    /// was not invoked. Carries the remaining cooldown for client backoff.
    #[error("circuit is open, service unavailable, retry in {} seconds", .retry_after.as_secs())]
    Open { retry_after: Duration },

    /// The operation itself failed. The failure has already been recorded
    /// against the breaker before this is returned.
    #[error(transparent)]
    Operation(E),
}

/// Read-only view of breaker state, side-effect free
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    /// Seconds since the last recorded failure, if any
    pub seconds_since_last_failure: Option<u64>,
}

/// Mutable breaker bookkeeping, guarded by a single mutex
///
/// Invariants:
/// - `state == Open` implies `last_failure` is `Some`.
/// - Any transition to `Closed` resets `failure_count` to zero.
#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker guarding the outbound AI call
///
/// The full read-modify-write of `(state, failure_count, last_failure)` runs
/// under one mutex in the pre-call gate and the post-call bookkeeping. The
/// lock is not held across the awaited operation, so the breaker never
/// serializes concurrent AI calls in the `Closed` state.
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    failure_threshold: u32,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    /// Create a breaker with the system clock
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self::with_clock(failure_threshold, cooldown, Arc::new(SystemClock))
    }

    /// Create a breaker with an injected time source (used by tests)
    pub fn with_clock(failure_threshold: u32, cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
            failure_threshold,
            cooldown,
            clock,
        }
    }

    /// Run `op` under the breaker state machine
    ///
    /// Performs at most one attempt. Fails fast with [`BreakerError::Open`]
    /// when the circuit is open and the cooldown has not elapsed; otherwise
    /// the operation's own failure is recorded and propagated.
    pub async fn execute<F, Fut, T, E>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        if let Some(retry_after) = self.gate() {
            return Err(BreakerError::Open { retry_after });
        }

        match op().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(err) => {
                self.on_failure();
                Err(BreakerError::Operation(err))
            }
        }
    }

    /// Read-only snapshot of the breaker state
    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        let now = self.clock.now();
        BreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            seconds_since_last_failure: inner
                .last_failure
                .map(|t| now.saturating_duration_since(t).as_secs()),
        }
    }

    /// Pre-call gate: decide whether the call may proceed
    ///
    /// Returns the remaining cooldown when the call must be rejected. When
    /// the cooldown has elapsed in the `Open` state, transitions to
    /// `HalfOpen` and lets this same invocation attempt the trial call.
    fn gate(&self) -> Option<Duration> {
        let mut inner = self.lock();

        if inner.state != CircuitState::Open {
            return None;
        }

        // Open implies last_failure is set; a missing timestamp means the
        // cooldown cannot be computed, so treat it as elapsed.
        let elapsed = inner
            .last_failure
            .map(|t| self.clock.now().saturating_duration_since(t));

        match elapsed {
            Some(elapsed) if elapsed < self.cooldown => Some(self.cooldown - elapsed),
            _ => {
                inner.state = CircuitState::HalfOpen;
                tracing::info!(
                    failure_count = inner.failure_count,
                    "Circuit cooldown elapsed, transitioning to half-open for trial call"
                );
                None
            }
        }
    }

    fn on_success(&self) {
        let mut inner = self.lock();
        inner.failure_count = 0;
        if inner.state != CircuitState::Closed {
            tracing::info!(
                from = inner.state.as_str(),
                "Trial call succeeded, circuit closed"
            );
            inner.state = CircuitState::Closed;
        }
    }

    fn on_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count += 1;
        inner.last_failure = Some(self.clock.now());

        // Any failure while half-open reopens the circuit, regardless of
        // whether the count has reached the threshold.
        if inner.state == CircuitState::HalfOpen {
            tracing::warn!(
                failure_count = inner.failure_count,
                "Trial call failed, circuit re-opened"
            );
            inner.state = CircuitState::Open;
        } else if inner.failure_count >= self.failure_threshold {
            if inner.state != CircuitState::Open {
                tracing::warn!(
                    failure_count = inner.failure_count,
                    threshold = self.failure_threshold,
                    "Failure threshold reached, circuit opened"
                );
            }
            inner.state = CircuitState::Open;
        } else {
            tracing::debug!(
                failure_count = inner.failure_count,
                threshold = self.failure_threshold,
                "AI call failure recorded (circuit still closed)"
            );
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        // A poisoned lock means a panic mid-bookkeeping; the counters are
        // plain integers so the data is still usable.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
