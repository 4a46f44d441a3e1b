//! Retry policies.
//!
//! A [`RetryPolicy`] looks at the latest response and the responses of all
//! earlier attempts of the same logical request, and decides two things:
//!
//! - whether to send the request again, and
//! - the earliest point in time at which the destination may be contacted
//!   again.
//!
//! The second part is reported even when the policy does not retry, because
//! it still applies to the next request sent to the same destination.
//!
//! Only `429 Too Many Requests`, `500 Internal Server Error` and
//! `503 Service Unavailable` are considered retryable. Every built-in policy
//! gives up once the delay it would wait for reaches its `max_retry_after`,
//! which guarantees that the retry loop ends.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use strum::{Display, EnumIter, EnumString, VariantNames};

use crate::backoff::exponential_backoff;
use crate::clock::{saturating_add, until};
use crate::ratelimit::RetryAfter;
use crate::retryable::RetryExt;
use crate::ResponseHead;

/// Default maximum honored delay: 720 hours, i.e. 30 days
pub const DEFAULT_MAX_RETRY_AFTER: Duration = Duration::from_secs(720 * 60 * 60);

/// The outcome of a [`RetryPolicy`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryDecision {
    /// Whether to send the request again
    pub retry: bool,
    /// Requests to this destination must not be sent before this time
    pub next_permitted_at: Option<SystemTime>,
}

impl RetryDecision {
    /// Don't retry and leave the rate limiter alone
    pub const DONE: Self = Self {
        retry: false,
        next_permitted_at: None,
    };

    /// Create a new decision
    #[must_use]
    pub const fn new(retry: bool, next_permitted_at: Option<SystemTime>) -> Self {
        Self {
            retry,
            next_permitted_at,
        }
    }
}

/// Decides whether and when to retry a request.
///
/// `history` holds the responses of all earlier attempts of the same
/// request, oldest first. `now` is the current time as seen by the client's
/// clock.
///
/// Any function or closure with the matching signature is a policy as well:
///
/// ```
/// use std::time::SystemTime;
/// use throttle_lib::{ResponseHead, RetryDecision, RetryPolicy};
///
/// fn retry_immediately(
///     response: &ResponseHead,
///     _history: &[ResponseHead],
///     _now: SystemTime,
/// ) -> RetryDecision {
///     RetryDecision::new(response.status.as_u16() == 429, None)
/// }
///
/// let head = ResponseHead::from(http::StatusCode::TOO_MANY_REQUESTS);
/// assert!(retry_immediately.decide(&head, &[], SystemTime::now()).retry);
/// ```
pub trait RetryPolicy: Send + Sync {
    /// Decide whether to retry after receiving `response`
    fn decide(
        &self,
        response: &ResponseHead,
        history: &[ResponseHead],
        now: SystemTime,
    ) -> RetryDecision;
}

impl<F> RetryPolicy for F
where
    F: Fn(&ResponseHead, &[ResponseHead], SystemTime) -> RetryDecision + Send + Sync,
{
    fn decide(
        &self,
        response: &ResponseHead,
        history: &[ResponseHead],
        now: SystemTime,
    ) -> RetryDecision {
        self(response, history, now)
    }
}

/// Exponential backoff, ignoring any `Retry-After` header.
///
/// Retries retryable statuses after 1s, 2s, 4s, ... counted from now. Once
/// that delay reaches `max_retry_after` it gives up, but still reports the
/// computed time to the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    max_retry_after: Duration,
}

impl ExponentialBackoff {
    /// Give up once the backoff reaches `max_retry_after`
    #[must_use]
    pub const fn new(max_retry_after: Duration) -> Self {
        Self { max_retry_after }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRY_AFTER)
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn decide(
        &self,
        response: &ResponseHead,
        history: &[ResponseHead],
        now: SystemTime,
    ) -> RetryDecision {
        if !response.should_retry() {
            return RetryDecision::DONE;
        }

        let delay = exponential_backoff(history.len());
        RetryDecision::new(
            delay < self.max_retry_after,
            Some(saturating_add(now, delay)),
        )
    }
}

/// Honor `Retry-After` headers given in seconds.
///
/// Retries retryable statuses as long as the header's delay is below
/// `max_retry_after`; without a usable header it retries right away. The
/// header is read regardless of the status, so even a successful response
/// can push back later requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAfterSeconds {
    max_retry_after: Duration,
}

impl RetryAfterSeconds {
    /// Give up on delays at or beyond `max_retry_after`
    #[must_use]
    pub const fn new(max_retry_after: Duration) -> Self {
        Self { max_retry_after }
    }
}

impl Default for RetryAfterSeconds {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRY_AFTER)
    }
}

impl RetryPolicy for RetryAfterSeconds {
    fn decide(
        &self,
        response: &ResponseHead,
        _history: &[ResponseHead],
        now: SystemTime,
    ) -> RetryDecision {
        let delay = response
            .retry_after()
            .and_then(RetryAfter::parse)
            .and_then(RetryAfter::delay)
            .unwrap_or(Duration::ZERO);
        let next_permitted_at = (!delay.is_zero()).then(|| saturating_add(now, delay));

        RetryDecision::new(
            response.should_retry() && delay < self.max_retry_after,
            next_permitted_at,
        )
    }
}

/// Honor `Retry-After` headers given as an HTTP date.
///
/// Retries retryable statuses as long as the date is less than
/// `max_retry_after` away; without a usable header it retries right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAfterDate {
    max_retry_after: Duration,
}

impl RetryAfterDate {
    /// Give up on dates at or beyond `max_retry_after` from now
    #[must_use]
    pub const fn new(max_retry_after: Duration) -> Self {
        Self { max_retry_after }
    }
}

impl Default for RetryAfterDate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRY_AFTER)
    }
}

impl RetryPolicy for RetryAfterDate {
    fn decide(
        &self,
        response: &ResponseHead,
        _history: &[ResponseHead],
        now: SystemTime,
    ) -> RetryDecision {
        let next_permitted_at = response
            .retry_after()
            .and_then(RetryAfter::parse)
            .and_then(RetryAfter::date);
        let delay = next_permitted_at.map_or(Duration::ZERO, |date| until(now, date));

        RetryDecision::new(
            response.should_retry() && delay < self.max_retry_after,
            next_permitted_at,
        )
    }
}

/// Honor `Retry-After` in either form and fall back to exponential backoff.
///
/// This is the default policy. It retries retryable statuses, waiting for
/// the `Retry-After` delay or date if the server sent one, or backing off
/// exponentially (see [`ExponentialBackoff`]) if it didn't. It gives up once
/// the delay reaches `max_retry_after`.
///
/// A `Retry-After` header on a non-retryable response is still reported to
/// the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdiomaticRetryAfter {
    max_retry_after: Duration,
}

impl IdiomaticRetryAfter {
    /// Give up on delays at or beyond `max_retry_after`
    #[must_use]
    pub const fn new(max_retry_after: Duration) -> Self {
        Self { max_retry_after }
    }
}

impl Default for IdiomaticRetryAfter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRY_AFTER)
    }
}

impl RetryPolicy for IdiomaticRetryAfter {
    fn decide(
        &self,
        response: &ResponseHead,
        history: &[ResponseHead],
        now: SystemTime,
    ) -> RetryDecision {
        let retryable = response.should_retry();
        let header = response.retry_after();

        // A header can come with any status, so only bail out early if
        // there is nothing to report to the rate limiter either.
        if !retryable && header.is_none() {
            return RetryDecision::DONE;
        }

        let (delay, next_permitted_at) = match header.and_then(RetryAfter::parse) {
            Some(RetryAfter::Delay(delay)) if !delay.is_zero() => {
                (delay, Some(saturating_add(now, delay)))
            }
            Some(RetryAfter::Date(date)) => (until(now, date), Some(date)),
            _ if retryable => {
                let delay = exponential_backoff(history.len());
                (delay, Some(saturating_add(now, delay)))
            }
            _ => (Duration::ZERO, None),
        };

        RetryDecision::new(retryable && delay < self.max_retry_after, next_permitted_at)
    }
}

/// The built-in policies, e.g. for selection in a config file
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    VariantNames,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// [`IdiomaticRetryAfter`]
    #[default]
    Idiomatic,
    /// [`ExponentialBackoff`]
    ExponentialBackoff,
    /// [`RetryAfterSeconds`]
    RetryAfterSeconds,
    /// [`RetryAfterDate`]
    RetryAfterDate,
}

impl PolicyKind {
    /// Instantiate the policy with the given maximum honored delay
    #[must_use]
    pub fn into_policy(self, max_retry_after: Duration) -> Arc<dyn RetryPolicy> {
        match self {
            Self::Idiomatic => Arc::new(IdiomaticRetryAfter::new(max_retry_after)),
            Self::ExponentialBackoff => Arc::new(ExponentialBackoff::new(max_retry_after)),
            Self::RetryAfterSeconds => Arc::new(RetryAfterSeconds::new(max_retry_after)),
            Self::RetryAfterDate => Arc::new(RetryAfterDate::new(max_retry_after)),
        }
    }
}
