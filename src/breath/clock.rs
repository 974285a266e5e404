//! Clock sources for session timing.
//!
//! Phase and hold timing only ever use the monotonic half of a reading.
//! The wall-clock half is recorded for reporting.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// A point on a monotonic timeline, measured from the clock's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct MonoTime(Duration);

impl MonoTime {
    /// The clock origin.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// A point `ms` milliseconds after the origin.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is later.
    #[must_use]
    pub fn saturating_since(self, earlier: Self) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    /// This point moved forward by `by`.
    #[must_use]
    pub fn shifted(self, by: Duration) -> Self {
        Self(self.0.saturating_add(by))
    }
}

/// One reading of a clock: a monotonic instant paired with wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Monotonic instant, used for all elapsed-time math
    pub mono: MonoTime,
    /// Wall-clock time, used only for records
    pub wall: DateTime<Utc>,
}

/// Source of clock readings.
pub trait Clock {
    /// Read the clock.
    fn now(&self) -> ClockReading;
}

/// Clock backed by [`Instant`] and the system wall clock.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose monotonic origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> ClockReading {
        ClockReading {
            mono: MonoTime(self.origin.elapsed()),
            wall: Utc::now(),
        }
    }
}

/// Hand-driven clock for simulations and tests.
///
/// Clones share the same timeline, so a test can keep one handle while a
/// controller owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    offset: Rc<Cell<Duration>>,
    wall_origin: DateTime<Utc>,
}

impl ManualClock {
    /// Create a clock at the origin whose wall time starts at `wall_origin`.
    #[must_use]
    pub fn new(wall_origin: DateTime<Utc>) -> Self {
        Self {
            offset: Rc::new(Cell::new(Duration::ZERO)),
            wall_origin,
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get().saturating_add(by));
    }

    /// Move the clock forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Current monotonic instant.
    #[must_use]
    pub fn mono(&self) -> MonoTime {
        MonoTime(self.offset.get())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> ClockReading {
        let offset = self.offset.get();
        let wall = chrono::Duration::from_std(offset)
            .map_or(self.wall_origin, |d| self.wall_origin + d);
        ClockReading {
            mono: MonoTime(offset),
            wall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mono_time_math() {
        let a = MonoTime::from_millis(1000);
        let b = MonoTime::from_millis(4000);
        assert_eq!(b.saturating_since(a), Duration::from_millis(3000));
        assert_eq!(a.saturating_since(b), Duration::ZERO);
        assert_eq!(a.shifted(Duration::from_millis(500)), MonoTime::from_millis(1500));
    }

    #[test]
    fn test_manual_clock_shared_timeline() {
        let origin = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(origin);
        let handle = clock.clone();

        handle.advance_ms(2500);

        let reading = clock.now();
        assert_eq!(reading.mono, MonoTime::from_millis(2500));
        assert_eq!(reading.wall, origin + chrono::Duration::milliseconds(2500));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now().mono;
        let second = clock.now().mono;
        assert!(second >= first);
    }
}
