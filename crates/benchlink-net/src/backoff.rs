//! Retry delay for restarting a failed message server.

use std::time::Duration;

/// Additive backoff: `base`, `base + step`, `base + 2·step`, ... capped at
/// `ceiling`.
///
/// With `reset_after` set, a server that stayed up at least that long
/// before failing is treated as healthy and the next delay starts from
/// `base` again. With `reset_after = None` the delay only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketBackoff {
    base: Duration,
    step: Duration,
    ceiling: Duration,
    reset_after: Option<Duration>,
    current: Duration,
}

impl SocketBackoff {
    pub fn new(
        base: Duration,
        step: Duration,
        ceiling: Duration,
        reset_after: Option<Duration>,
    ) -> Self {
        let ceiling = ceiling.max(base);
        Self {
            base,
            step,
            ceiling,
            reset_after,
            current: base,
        }
    }

    /// The delay the next failure will wait.
    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Returns the delay to wait now and advances to the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current + self.step).min(self.ceiling);
        delay
    }

    /// Like [`next_delay`](Self::next_delay), first resetting if the server
    /// had been up for `uptime` of at least `reset_after`.
    pub fn on_failure(&mut self, uptime: Option<Duration>) -> Duration {
        if let (Some(threshold), Some(uptime)) = (self.reset_after, uptime) {
            if uptime >= threshold {
                self.reset();
            }
        }
        self.next_delay()
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbounded() -> SocketBackoff {
        SocketBackoff::new(
            Duration::from_secs(5),
            Duration::from_secs(5),
            Duration::from_secs(120),
            None,
        )
    }

    #[test]
    fn test_additive_sequence_caps_at_ceiling() {
        let mut backoff = unbounded();
        let delays: Vec<u64> = (0..30).map(|_| backoff.next_delay().as_secs()).collect();

        assert_eq!(&delays[..4], &[5, 10, 15, 20]);
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert!(delays.iter().all(|&d| d <= 120));
        assert_eq!(delays[23], 120);
        assert_eq!(delays[29], 120);
    }

    #[test]
    fn test_no_reset_without_threshold() {
        let mut backoff = unbounded();
        backoff.next_delay();
        backoff.next_delay();
        let delay = backoff.on_failure(Some(Duration::from_secs(3600)));
        assert_eq!(delay, Duration::from_secs(15));
    }

    #[test]
    fn test_sustained_uptime_resets_to_base() {
        let mut backoff = SocketBackoff::new(
            Duration::from_secs(5),
            Duration::from_secs(5),
            Duration::from_secs(120),
            Some(Duration::from_secs(300)),
        );
        assert_eq!(backoff.on_failure(Some(Duration::from_secs(1))), Duration::from_secs(5));
        assert_eq!(backoff.on_failure(Some(Duration::from_secs(299))), Duration::from_secs(10));
        assert_eq!(backoff.on_failure(Some(Duration::from_secs(300))), Duration::from_secs(5));
        assert_eq!(backoff.on_failure(None), Duration::from_secs(10));
    }

    #[test]
    fn test_ceiling_never_below_base() {
        let mut backoff = SocketBackoff::new(
            Duration::from_secs(10),
            Duration::from_secs(5),
            Duration::from_secs(1),
            None,
        );
        assert_eq!(backoff.next_delay(), Duration::from_secs(10));
        assert_eq!(backoff.next_delay(), Duration::from_secs(10));
    }
}
