//! Handle the `Retry-After` header.

use std::time::{Duration, SystemTime};

/// A parsed `Retry-After` header value, as specified per
/// [RFC 7231 section 7.1.3](https://www.rfc-editor.org/rfc/rfc7231#section-7.1.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfter {
    /// `delay-seconds`: wait this long, counted from when the response was
    /// received
    Delay(Duration),
    /// `HTTP-date`: wait until this point in time
    Date(SystemTime),
}

impl RetryAfter {
    /// Parse a `Retry-After` header value.
    ///
    /// A string of ASCII digits is a delay in seconds; everything else is
    /// tried as an HTTP date. Values that are neither return `None`, which
    /// callers treat the same as a missing header.
    ///
    /// ```
    /// use std::time::Duration;
    /// use throttle_lib::ratelimit::RetryAfter;
    ///
    /// assert_eq!(RetryAfter::parse("10"), Some(RetryAfter::Delay(Duration::from_secs(10))));
    /// assert_eq!(RetryAfter::parse("soon"), None);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        // RFC 7231: Retry-After = HTTP-date / delay-seconds
        parse_delay_seconds(value)
            .map(Self::Delay)
            .or_else(|| httpdate::parse_http_date(value).ok().map(Self::Date))
    }

    /// The delay in seconds, if the header was given as one
    #[must_use]
    pub const fn delay(self) -> Option<Duration> {
        match self {
            Self::Delay(delay) => Some(delay),
            Self::Date(_) => None,
        }
    }

    /// The point in time, if the header was given as an HTTP date
    #[must_use]
    pub const fn date(self) -> Option<SystemTime> {
        match self {
            Self::Date(date) => Some(date),
            Self::Delay(_) => None,
        }
    }
}

/// `delay-seconds = 1*DIGIT`. Signs and whitespace are rejected, which `u64`
/// parsing alone would accept for a leading `+`.
fn parse_delay_seconds(value: &str) -> Option<Duration> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok().map(Duration::from_secs)
}
