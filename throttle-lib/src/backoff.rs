//! Exponential backoff math.

use std::time::Duration;

/// Largest exponent used for doubling. `2^63` still fits into a `u64`; every
/// later doubling saturates here instead of overflowing.
const MAX_EXPONENT: u64 = 63;

/// `2^exponent`, with the exponent clamped to 63.
pub(crate) const fn max_power_of_two(exponent: u64) -> u64 {
    let exponent = if exponent > MAX_EXPONENT {
        MAX_EXPONENT
    } else {
        exponent
    };
    1 << exponent
}

/// The delay before the next attempt after `previous_attempts` failed ones.
///
/// Starts at one second and doubles for every previous attempt:
/// 1s, 2s, 4s, 8s, ... up to `2^63` seconds.
///
/// ```
/// use std::time::Duration;
/// use throttle_lib::exponential_backoff;
///
/// assert_eq!(exponential_backoff(0), Duration::from_secs(1));
/// assert_eq!(exponential_backoff(3), Duration::from_secs(8));
/// ```
#[must_use]
pub fn exponential_backoff(previous_attempts: usize) -> Duration {
    let exponent = u64::try_from(previous_attempts).unwrap_or(u64::MAX);
    Duration::from_secs(max_power_of_two(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(2, 4)]
    #[case(10, 1024)]
    #[case(63, 1 << 63)]
    #[case(64, 1 << 63)]
    #[case(u64::MAX, 1 << 63)]
    fn test_max_power_of_two(#[case] exponent: u64, #[case] expected: u64) {
        assert_eq!(max_power_of_two(exponent), expected);
    }

    #[test]
    fn test_exponential_backoff() {
        assert_eq!(exponential_backoff(0), Duration::from_secs(1));
        assert_eq!(exponential_backoff(1), Duration::from_secs(2));
        assert_eq!(exponential_backoff(2), Duration::from_secs(4));
        assert_eq!(exponential_backoff(1_000), Duration::from_secs(1 << 63));
    }
}
