use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::time::TimeUnit;

/// A source of "now" for latest-data lookups and read stamps.
pub trait Clock: Send + Sync + 'static {
    /// Current time in milliseconds since the UNIX epoch.
    fn now(&self) -> TimeUnit;
}

/// Wall clock backed by `std::time::SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeUnit {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        TimeUnit::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

/// A clock that uses the CPU's Time-Stamp Counter (TSC) via the `quanta` crate.
///
/// Anchored to `SystemTime` at construction and advanced by TSC ticks, so it
/// never jumps backwards under NTP adjustments.
#[derive(Debug, Clone)]
pub struct QuantaClock {
    clock: quanta::Clock,
    start_wall: TimeUnit,
    start_instant: quanta::Instant,
}

impl Default for QuantaClock {
    fn default() -> Self {
        let clock = quanta::Clock::new();
        let start_instant = clock.now();
        Self {
            clock,
            start_wall: SystemClock.now(),
            start_instant,
        }
    }
}

impl QuantaClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for QuantaClock {
    fn now(&self) -> TimeUnit {
        let delta = self.clock.now().duration_since(self.start_instant);
        self.start_wall.add(delta)
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(now: TimeUnit) -> Self {
        Self {
            now_ms: AtomicU64::new(now.as_millis()),
        }
    }

    pub fn set(&self, now: TimeUnit) {
        self.now_ms.store(now.as_millis(), Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeUnit {
        TimeUnit::from_millis(self.now_ms.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quanta_clock_tracks_wall_clock() {
        let wall = SystemClock.now();
        let tsc = QuantaClock::new().now();
        assert!(tsc >= wall);
        assert!(tsc.as_millis() - wall.as_millis() < 60_000);
    }

    #[test]
    fn manual_clock_is_settable() {
        let clock = ManualClock::new(TimeUnit::from_secs(10));
        assert_eq!(clock.now(), TimeUnit::from_secs(10));
        clock.set(TimeUnit::from_secs(20));
        assert_eq!(clock.now(), TimeUnit::from_secs(20));
    }
}
