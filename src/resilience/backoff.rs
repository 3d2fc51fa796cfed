//! Exponential backoff schedule.

use std::time::Duration;

/// Delay before retry number `retry_index` (0-based): `initial * 2^retry_index`.
///
/// Saturates instead of overflowing for very large indices.
pub fn delay_for(initial: Duration, retry_index: u32) -> Duration {
    initial.saturating_mul(2u32.saturating_pow(retry_index))
}

/// Iterator over the successive backoff delays d, 2d, 4d, ...
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    retry_index: u32,
}

impl Backoff {
    pub fn new(initial: Duration) -> Self {
        Self {
            initial,
            retry_index: 0,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = delay_for(self.initial, self.retry_index);
        self.retry_index = self.retry_index.saturating_add(1);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let d = Duration::from_millis(100);
        assert_eq!(delay_for(d, 0), Duration::from_millis(100));
        assert_eq!(delay_for(d, 1), Duration::from_millis(200));
        assert_eq!(delay_for(d, 4), Duration::from_millis(1600));

        let schedule: Vec<_> = Backoff::new(d).take(4).collect();
        assert_eq!(
            schedule,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
    }

    #[test]
    fn test_backoff_saturates() {
        let huge = delay_for(Duration::from_secs(1), 200);
        assert_eq!(huge, Duration::from_secs(1).saturating_mul(u32::MAX));
        let mut schedule = Backoff::new(Duration::MAX);
        assert_eq!(schedule.nth(3), Some(Duration::MAX));
        let mut long_run = Backoff::new(Duration::from_secs(1));
        assert_eq!(long_run.nth(40), Some(huge));
    }
}
