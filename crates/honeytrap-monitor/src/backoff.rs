//! Exponential restart delay: `min(max, base * 2^attempt)`.

use std::time::Duration;

/// Restart delay schedule.
#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    base_ms: u64,
    max_ms: u64,
    attempt: u32,
}

impl Backoff {
    pub(crate) fn new(base: Duration, max: Duration) -> Self {
        Self {
            base_ms: u64::try_from(base.as_millis()).unwrap_or(u64::MAX),
            max_ms: u64::try_from(max.as_millis()).unwrap_or(u64::MAX),
            attempt: 0,
        }
    }

    /// Delay to wait before the next restart.
    pub(crate) fn current(&self) -> Duration {
        let exp = self
            .base_ms
            .saturating_mul(1u64.checked_shl(self.attempt).unwrap_or(u64::MAX));
        Duration::from_millis(exp.min(self.max_ms))
    }

    /// Move to the next, longer delay.
    pub(crate) fn advance(&mut self) {
        self.attempt = self.attempt.saturating_add(1);
    }

    /// Back to the base delay.
    pub(crate) fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_from_base() {
        let mut b = Backoff::new(Duration::from_secs(1), Duration::from_secs(60));
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(b.current().as_secs());
            b.advance();
        }
        assert_eq!(seen, [1, 2, 4, 8, 16, 32, 60, 60]);
    }

    #[test]
    fn test_reset() {
        let mut b = Backoff::new(Duration::from_millis(10), Duration::from_secs(1));
        b.advance();
        b.advance();
        assert_eq!(b.current(), Duration::from_millis(40));
        b.reset();
        assert_eq!(b.current(), Duration::from_millis(10));
    }

    #[test]
    fn test_attempt_saturates() {
        let mut b = Backoff::new(Duration::from_secs(1), Duration::from_secs(60));
        b.attempt = u32::MAX;
        b.advance();
        assert_eq!(b.current(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_base() {
        let mut b = Backoff::new(Duration::ZERO, Duration::ZERO);
        b.advance();
        assert_eq!(b.current(), Duration::ZERO);
    }
}
