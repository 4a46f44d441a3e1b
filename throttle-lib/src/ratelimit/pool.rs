use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

use crate::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::ratelimit::{HostKey, RateLimiter};

/// Keeps one [`RateLimiter`] per destination host.
///
/// Limiters are created lazily on first access. Concurrent first accesses to
/// the same host always end up with the same limiter instance. Cloning a
/// `HostPool` is cheap and the clone shares all limiters with the original.
#[derive(Debug, Clone)]
pub struct HostPool {
    /// Map of hostname to limiter, created on-demand
    limiters: Arc<DashMap<HostKey, Arc<RateLimiter>>>,

    /// Handed to every limiter created by this pool
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for HostPool {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(TokioSleeper))
    }
}

impl HostPool {
    /// Create an empty pool whose limiters use the given clock and sleeper
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            limiters: Arc::new(DashMap::new()),
            clock,
            sleeper,
        }
    }

    /// Get the limiter for `host`, creating a fresh one if there is none yet
    #[must_use]
    pub fn get_or_create(&self, host: &HostKey) -> Arc<RateLimiter> {
        if let Some(limiter) = self.limiters.get(host) {
            return Arc::clone(&limiter);
        }

        // Another task may have created it in between; the entry API makes
        // sure only one of them gets stored.
        match self.limiters.entry(host.clone()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                log::debug!("Creating rate limiter for host `{host}`");
                let limiter = Arc::new(RateLimiter::new(
                    Arc::clone(&self.clock),
                    Arc::clone(&self.sleeper),
                ));
                Arc::clone(entry.insert(limiter).value())
            }
        }
    }

    /// Remove the limiter for `hostname`.
    ///
    /// The next request to that host starts over with a fresh limiter.
    /// Requests already holding the old limiter keep using it.
    ///
    /// Returns `true` if a limiter was removed.
    pub fn forget(&self, hostname: &str) -> bool {
        let host_key = HostKey::from(hostname);
        let removed = self.limiters.remove(&host_key).is_some();
        if removed {
            log::debug!("Forgot rate limiter for host `{host_key}`");
        }
        removed
    }

    /// Number of hosts that currently have a limiter
    #[must_use]
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    /// Whether no host has a limiter yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }

    /// All hosts that currently have a limiter, in no particular order
    #[must_use]
    pub fn hosts(&self) -> Vec<HostKey> {
        self.limiters.iter().map(|entry| entry.key().clone()).collect()
    }
}
