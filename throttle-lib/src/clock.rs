//! Sources of time used by the rate limiter and the retry policies.
//!
//! Every component that needs to know the current time or has to wait holds
//! a [`Clock`] and a [`Sleeper`]. Production code uses [`SystemClock`] and
//! [`TokioSleeper`]; tests can inject a [`FrozenClock`] and a
//! [`RecordingSleeper`] to make waits observable and deterministic.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

/// Reads the current time.
pub trait Clock: Debug + Send + Sync {
    /// The current point in time.
    fn now(&self) -> SystemTime;
}

/// Suspends the calling task.
#[async_trait]
pub trait Sleeper: Debug + Send + Sync {
    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Suspends via [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a clone handed to a client can
/// still be advanced from the outside.
#[derive(Debug, Clone)]
pub struct FrozenClock {
    now: Arc<Mutex<SystemTime>>,
}

impl FrozenClock {
    /// Create a clock frozen at `now`.
    #[must_use]
    pub fn new(now: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Move the clock to `now`. This may also move it backwards.
    pub fn set(&self, now: SystemTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = saturating_add(*now, duration);
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A sleeper that returns immediately and remembers every requested duration.
///
/// When attached to a [`FrozenClock`], each sleep advances that clock by the
/// requested duration, which mimics time passing during the wait.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
    clock: Option<FrozenClock>,
}

impl RecordingSleeper {
    /// Create a sleeper that only records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sleeper that records and advances `clock` on every sleep.
    #[must_use]
    pub fn advancing(clock: FrozenClock) -> Self {
        Self {
            sleeps: Arc::default(),
            clock: Some(clock),
        }
    }

    /// All durations slept so far, in call order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
    }
}

/// `time + duration`, clamped to the latest instant the platform can
/// represent instead of panicking on overflow.
pub(crate) fn saturating_add(time: SystemTime, duration: Duration) -> SystemTime {
    let mut duration = duration;
    loop {
        if let Some(later) = time.checked_add(duration) {
            return later;
        }
        duration /= 2;
    }
}

/// Time left from `now` until `then`, or zero if `then` already passed.
pub(crate) fn until(now: SystemTime, then: SystemTime) -> Duration {
    then.duration_since(now).unwrap_or(Duration::ZERO)
}
