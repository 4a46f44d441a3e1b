use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::policy::{DEFAULT_MAX_RETRY_AFTER, PolicyKind};

/// Retry and rate limiting configuration, e.g. as read from a config file
///
/// ```
/// use std::time::Duration;
/// use throttle_lib::{PolicyKind, RetryConfig};
///
/// let config: RetryConfig = toml::from_str(r#"
///     policy = "exponential_backoff"
///     max_retry_after = "2h"
/// "#).unwrap();
/// assert_eq!(config.policy, PolicyKind::ExponentialBackoff);
/// assert_eq!(config.max_retry_after, Duration::from_secs(2 * 60 * 60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Which built-in policy decides whether and when to retry
    #[serde(default)]
    pub policy: PolicyKind,

    /// Delays at or beyond this are not honored and end the retry loop
    #[serde(default = "default_max_retry_after", with = "humantime_serde")]
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            max_retry_after: default_max_retry_after(),
        }
    }
}

const fn default_max_retry_after() -> Duration {
    DEFAULT_MAX_RETRY_AFTER
}

impl RetryConfig {
    /// Create a `RetryConfig` from CLI options, using defaults for missing values
    #[must_use]
    pub fn from_options(policy: Option<PolicyKind>, max_retry_after: Option<Duration>) -> Self {
        Self {
            policy: policy.unwrap_or_default(),
            max_retry_after: max_retry_after.unwrap_or(DEFAULT_MAX_RETRY_AFTER),
        }
    }
}
