//! Wall-clock access for the scheduler.
//!
//! Times are durations since the Unix epoch. Sleeping always goes through
//! tokio's timer, so tests can pause and advance time.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

/// Longest wait handed to the timer; later times are clamped to it.
pub const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `base + by`, with `by` clamped to [`FAR_FUTURE`].
pub fn offset_instant(base: Instant, by: Duration) -> Instant {
    base + by.min(FAR_FUTURE)
}

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current time since the Unix epoch.
    fn now(&self) -> Duration;

    /// The tokio instant at which the wall clock reads `at`.
    ///
    /// Times already past map to now; times beyond [`FAR_FUTURE`] map to
    /// that.
    fn instant_at(&self, at: Duration) -> Instant {
        offset_instant(Instant::now(), at.saturating_sub(self.now()))
    }
}

/// The operating system's clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// A wall clock that reads tokio's timer, starting from a chosen epoch
/// offset.
///
/// Under a paused test runtime it follows virtual time exactly.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
    start: Duration,
}

impl TokioClock {
    /// A clock reading `start` now.
    pub fn starting_at(start: Duration) -> Self {
        Self {
            origin: Instant::now(),
            start,
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.start.saturating_add(self.origin.elapsed())
    }

    fn instant_at(&self, at: Duration) -> Instant {
        offset_instant(self.origin, at.saturating_sub(self.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_virtual_time() {
        let clock = TokioClock::starting_at(Duration::from_secs(1_000));
        assert_eq!(clock.now(), Duration::from_secs(1_000));

        tokio::time::sleep_until(clock.instant_at(Duration::from_secs(1_600))).await;
        assert_eq!(clock.now(), Duration::from_secs(1_600));

        // Already past: no wait.
        let before = Instant::now();
        tokio::time::sleep_until(clock.instant_at(Duration::from_secs(10))).await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_times_are_clamped() {
        let clock = TokioClock::starting_at(Duration::from_secs(1_000));
        let origin = Instant::now();
        assert_eq!(clock.instant_at(Duration::MAX), origin + FAR_FUTURE);
        assert_eq!(SystemClock.instant_at(Duration::MAX), origin + FAR_FUTURE);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now() > Duration::from_secs(1_577_836_800));
    }
}
