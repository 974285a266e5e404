//! Frame tick scheduling.
//!
//! A [`Ticker`] hands out [`ScheduledTick`]s only while a registration is
//! held. Releasing the registration cancels its token, so a tick that was
//! scheduled before the release is dead by the time it is delivered.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Default frame interval, roughly 60 frames per second.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    /// A live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token and every clone of it.
    pub fn cancel(&self) {
        self.0.set(true);
    }

    /// Whether the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A held frame registration. Dropping it cancels its token.
#[derive(Debug)]
pub struct TickRegistration {
    token: CancelToken,
}

impl TickRegistration {
    fn new() -> Self {
        Self {
            token: CancelToken::new(),
        }
    }
}

impl Drop for TickRegistration {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// A frame that was scheduled under some registration.
#[derive(Debug, Clone)]
pub struct ScheduledTick {
    token: CancelToken,
}

impl ScheduledTick {
    /// Whether the registration this tick belongs to is still held.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }
}

/// Frame scheduler for the session loop.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    registration: Option<TickRegistration>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl Ticker {
    /// Create an idle ticker with the given frame interval.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            registration: None,
        }
    }

    /// Frame interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Take a registration. Idempotent while one is held.
    pub fn acquire(&mut self) {
        if self.registration.is_none() {
            self.registration = Some(TickRegistration::new());
        }
    }

    /// Drop the registration, cancelling any tick already scheduled under it.
    pub fn release(&mut self) {
        self.registration = None;
    }

    /// Whether a registration is held.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.registration.is_some()
    }

    /// Schedule the next frame, if a registration is held.
    #[must_use]
    pub fn next_frame(&self) -> Option<ScheduledTick> {
        self.registration.as_ref().map(|r| ScheduledTick {
            token: r.token.clone(),
        })
    }

    /// How long the host may block waiting for input.
    ///
    /// `None` means no frames are due and the host may wait indefinitely.
    #[must_use]
    pub const fn poll_timeout(&self) -> Option<Duration> {
        if self.registration.is_some() {
            Some(self.interval)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_ticker_schedules_nothing() {
        let ticker = Ticker::default();
        assert!(!ticker.is_active());
        assert!(ticker.next_frame().is_none());
        assert!(ticker.poll_timeout().is_none());
    }

    #[test]
    fn test_release_cancels_scheduled_tick() {
        let mut ticker = Ticker::new(Duration::from_millis(10));
        ticker.acquire();
        let tick = ticker.next_frame().unwrap();
        assert!(tick.is_live());
        assert_eq!(ticker.poll_timeout(), Some(Duration::from_millis(10)));

        ticker.release();
        assert!(!tick.is_live());
        assert!(ticker.next_frame().is_none());
    }

    #[test]
    fn test_reacquire_does_not_revive_old_ticks() {
        let mut ticker = Ticker::default();
        ticker.acquire();
        let stale = ticker.next_frame().unwrap();
        ticker.release();
        ticker.acquire();

        assert!(!stale.is_live());
        assert!(ticker.next_frame().unwrap().is_live());
    }

    #[test]
    fn test_acquire_is_idempotent() {
        let mut ticker = Ticker::default();
        ticker.acquire();
        let tick = ticker.next_frame().unwrap();
        ticker.acquire();
        assert!(tick.is_live());
    }
}
