//! Capped exponential backoff

use std::time::Duration;

/// Doubling delay sequence bounded by a cap: with base 0.2s and cap 2s it
/// yields `0.2, 0.4, 0.8, 1.6, 2.0, 2.0, ...`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    max: Duration,
    current: Duration,
}

impl ExponentialBackoff {
    /// Create a doubling backoff. A base above the cap is clamped to it.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            max,
            current: base.min(max),
        }
    }

    /// Return the current delay and advance to `min(current * 2, max)`
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = delay
            .checked_mul(2)
            .map_or(self.max, |next| next.min(self.max));
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn take(backoff: &mut ExponentialBackoff, n: usize) -> Vec<Duration> {
        (0..n).map(|_| backoff.next_delay()).collect()
    }

    #[test]
    fn test_doubling_sequence_with_cap() {
        let mut backoff = ExponentialBackoff::new(ms(200), ms(2000));
        assert_eq!(
            take(&mut backoff, 7),
            vec![ms(200), ms(400), ms(800), ms(1600), ms(2000), ms(2000), ms(2000)]
        );
    }

    #[test]
    fn test_sequence_is_monotonic_and_bounded() {
        let mut backoff = ExponentialBackoff::new(ms(150), ms(1000));
        let delays = take(&mut backoff, 20);
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert!(delays.iter().all(|d| *d <= ms(1000)));
    }

    #[test]
    fn test_base_above_cap_is_clamped() {
        let mut backoff = ExponentialBackoff::new(ms(5000), ms(2000));
        assert_eq!(backoff.next_delay(), ms(2000));
        assert_eq!(backoff.next_delay(), ms(2000));
    }

    #[test]
    fn test_overflow_saturates_at_cap() {
        let mut backoff = ExponentialBackoff::new(Duration::MAX / 2, Duration::MAX);
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.next_delay(), Duration::MAX);
    }
}
