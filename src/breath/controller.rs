//! Session controller.
//!
//! Wires a [`BreathMachine`] to a clock, a frame ticker and a session store,
//! carrying out the effects the machine returns.

use tracing::{info, warn};

use super::clock::Clock;
use super::machine::{BreathMachine, BreathState, Effect, Signal, Snapshot};
use super::record::SessionRecord;
use super::settings::BreathSettings;
use super::storage::SessionStore;
use super::ticker::{ScheduledTick, Ticker};
use crate::error::BreathError;

/// Result of handing a finished session to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The session was written.
    Saved {
        /// Session identifier
        session_id: String,
    },
    /// The store rejected the session. The session is still complete.
    Failed {
        /// Session identifier
        session_id: String,
        /// Store error message
        error: String,
    },
}

impl PersistOutcome {
    /// Whether the session was written.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Drives one breath session at a time.
pub struct SessionController<C: Clock, S: SessionStore> {
    machine: BreathMachine,
    clock: C,
    store: S,
    ticker: Ticker,
    last_persist: Option<PersistOutcome>,
}

impl<C: Clock, S: SessionStore> SessionController<C, S> {
    /// Create an idle controller.
    pub fn new(clock: C, store: S, ticker: Ticker) -> Self {
        Self {
            machine: BreathMachine::new(),
            clock,
            store,
            ticker,
            last_persist: None,
        }
    }

    /// Start a session.
    ///
    /// # Errors
    ///
    /// Returns `BreathError::InvalidSettings` if the settings are rejected.
    pub fn start(&mut self, settings: BreathSettings) -> Result<Vec<Effect>, BreathError> {
        let effects = self.machine.start(settings, self.clock.now())?;
        if !effects.is_empty() {
            self.last_persist = None;
        }
        self.apply(&effects);
        Ok(effects)
    }

    /// Apply a signal at the current clock reading.
    pub fn signal(&mut self, signal: Signal) -> Vec<Effect> {
        let effects = self.machine.handle(signal, self.clock.now());
        self.apply(&effects);
        effects
    }

    /// Pause the session.
    pub fn pause(&mut self) -> Vec<Effect> {
        self.signal(Signal::Pause)
    }

    /// Resume a paused session.
    pub fn resume(&mut self) -> Vec<Effect> {
        self.signal(Signal::Resume)
    }

    /// Pause if running, resume if paused.
    pub fn toggle_pause(&mut self) -> Vec<Effect> {
        if self.machine.state() == BreathState::Paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// End the current hold.
    pub fn advance(&mut self) -> Vec<Effect> {
        self.signal(Signal::Advance)
    }

    /// End the session, keeping completed cycles.
    pub fn end_session(&mut self) -> Vec<Effect> {
        self.signal(Signal::EndSession)
    }

    /// The host lost visibility.
    pub fn visibility_lost(&mut self) -> Vec<Effect> {
        self.signal(Signal::VisibilityLost)
    }

    /// Return a finished controller to idle.
    pub fn reset(&mut self) -> Vec<Effect> {
        let effects = self.machine.reset();
        self.apply(&effects);
        effects
    }

    /// Schedule and run one frame, if the ticker holds a registration.
    pub fn frame(&mut self) -> Option<Vec<Effect>> {
        let tick = self.ticker.next_frame()?;
        Some(self.run_tick(&tick))
    }

    /// Run a previously scheduled frame. Cancelled frames do nothing.
    pub fn run_tick(&mut self, tick: &ScheduledTick) -> Vec<Effect> {
        if !tick.is_live() {
            return Vec::new();
        }
        let effects = self.machine.tick(self.clock.now());
        self.apply(&effects);
        effects
    }

    /// Presentation snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BreathState {
        self.machine.state()
    }

    /// Underlying machine.
    #[must_use]
    pub const fn machine(&self) -> &BreathMachine {
        &self.machine
    }

    /// Frame ticker.
    #[must_use]
    pub const fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Outcome of the last persistence attempt in this session.
    #[must_use]
    pub const fn last_persist(&self) -> Option<&PersistOutcome> {
        self.last_persist.as_ref()
    }

    /// Session store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn apply(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::AcquireTicks => self.ticker.acquire(),
                Effect::ReleaseTicks => self.ticker.release(),
                Effect::Persist(record) => self.persist(record),
                Effect::StateChanged { .. }
                | Effect::PhaseChanged(_)
                | Effect::BreathCompleted { .. }
                | Effect::CycleCompleted(_) => {}
            }
        }
    }

    fn persist(&mut self, record: &SessionRecord) {
        let session_id = record.session_id.clone();
        self.last_persist = Some(match self.store.save(record) {
            Ok(()) => {
                info!(session_id = %session_id, "session saved");
                PersistOutcome::Saved { session_id }
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "failed to save session");
                PersistOutcome::Failed {
                    session_id,
                    error: e.to_string(),
                }
            }
        });
    }
}
