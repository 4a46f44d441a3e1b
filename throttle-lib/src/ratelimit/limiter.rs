use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::clock::{self, Clock, Sleeper, SystemClock, TokioSleeper};

/// Holds the earliest point in time at which the next request may be sent.
///
/// The watermark can only move forward: [`RateLimiter::set_earliest_permitted_at`]
/// merges the new value with the stored one by taking the maximum, so
/// concurrent updates are never lost and never move it back. A new limiter
/// starts at the Unix epoch, which means "ready immediately".
///
/// Waiting via [`RateLimiter::wait_until_ready`] only suspends the calling
/// task. No lock is held while waiting, so other tasks can keep updating and
/// reading the same limiter.
#[derive(Debug)]
pub struct RateLimiter {
    /// Nanoseconds since the Unix epoch
    earliest_permitted: AtomicU64,

    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(TokioSleeper))
    }
}

impl RateLimiter {
    /// Create a limiter that is ready immediately
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            earliest_permitted: AtomicU64::new(0),
            clock,
            sleeper,
        }
    }

    /// The earliest point in time at which a request may be sent
    #[must_use]
    pub fn earliest_permitted_at(&self) -> SystemTime {
        from_nanos(self.earliest_permitted.load(Ordering::Acquire))
    }

    /// How long [`RateLimiter::wait_until_ready`] would currently wait
    #[must_use]
    pub fn remaining(&self) -> Duration {
        clock::until(self.clock.now(), self.earliest_permitted_at())
    }

    /// Suspend the calling task until the earliest permitted time.
    ///
    /// Returns the duration that was waited for. If the earliest permitted
    /// time already passed, this returns [`Duration::ZERO`] without
    /// suspending at all.
    pub async fn wait_until_ready(&self) -> Duration {
        let delay = self.remaining();
        if !delay.is_zero() {
            log::trace!("Rate limiter waiting for {}ms", delay.as_millis());
            self.sleeper.sleep(delay).await;
        }
        delay
    }

    /// Move the earliest permitted time to `time`, unless it is already
    /// later. This never blocks.
    pub fn set_earliest_permitted_at(&self, time: SystemTime) {
        self.earliest_permitted
            .fetch_max(to_nanos(time), Ordering::AcqRel);
    }

    /// Move the earliest permitted time to `delay` from now, unless it is
    /// already later. This never blocks.
    pub fn set_earliest_permitted_after(&self, delay: Duration) {
        let time = clock::saturating_add(self.clock.now(), delay);
        self.set_earliest_permitted_at(time);
    }
}

/// Instants before the epoch clamp to zero, instants past the year 2554 clamp
/// to `u64::MAX`.
fn to_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |since| u64::try_from(since.as_nanos()).unwrap_or(u64::MAX))
}

fn from_nanos(nanos: u64) -> SystemTime {
    clock::saturating_add(UNIX_EPOCH, Duration::from_nanos(nanos))
}
