//! Minimum-interval gate for rate limiting per-frame work.

use std::time::{Duration, Instant};

/// Accepts at most one event per `min_interval`
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// Create a new throttle
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Create a throttle from a millisecond interval
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Returns true and records `now` if enough time has passed since the
    /// last accepted instant
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Configured interval
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Forget the last accepted instant
    pub fn reset(&mut self) {
        self.last = None;
    }
}
