//! Application state for the trainer.

use crate::breath::{
    BreathSettings, BreathState, Clock, PersistOutcome, SessionController, SessionStore,
    SessionSummary, Snapshot,
};
use crate::breath::ticker::ScheduledTick;
use crate::tui::event::Action;

/// Key hints shown when there is no status message.
pub const KEY_HINTS: &str = "Space:start/next | p:pause | Esc:end | q:quit";

/// Trainer state.
pub struct App<C: Clock, S: SessionStore> {
    /// Session controller.
    controller: SessionController<C, S>,
    /// Settings used for the next session.
    pub settings: BreathSettings,
    /// Status message to display.
    pub status: Option<String>,
    /// Whether the next Esc ends the session.
    pub confirm_end: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Summary of the session that just finished.
    pub summary: Option<SessionSummary>,
}

impl<C: Clock, S: SessionStore> App<C, S> {
    /// Create a new app instance.
    pub fn new(controller: SessionController<C, S>, settings: BreathSettings) -> Self {
        Self {
            controller,
            settings,
            status: None,
            confirm_end: false,
            should_quit: false,
            summary: None,
        }
    }

    /// Presentation snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.controller.snapshot()
    }

    /// Session controller.
    #[must_use]
    pub const fn controller(&self) -> &SessionController<C, S> {
        &self.controller
    }

    /// Schedule the next frame, if frames are running.
    #[must_use]
    pub fn schedule_frame(&self) -> Option<ScheduledTick> {
        self.controller.ticker().next_frame()
    }

    /// Run a scheduled frame.
    pub fn run_frame(&mut self, tick: &ScheduledTick) {
        self.controller.run_tick(tick);
        self.after_transition();
    }

    /// Handle a user or host action.
    pub fn apply(&mut self, action: Action) {
        if action != Action::End {
            self.confirm_end = false;
        }

        match action {
            Action::Primary => self.primary(),
            Action::TogglePause => {
                if self.controller.state().is_in_session() {
                    self.controller.toggle_pause();
                    self.status = None;
                }
            }
            Action::End => self.end(),
            Action::FocusLost => {
                if self.controller.state().is_ticking() {
                    self.controller.visibility_lost();
                    self.status = Some("Paused while the terminal was in the background".to_string());
                }
            }
            Action::Quit => {
                if self.controller.state().is_in_session() {
                    self.controller.end_session();
                }
                self.should_quit = true;
            }
        }

        self.after_transition();
    }

    fn primary(&mut self) {
        match self.controller.state() {
            BreathState::Idle | BreathState::SessionComplete => {
                match self.controller.start(self.settings) {
                    Ok(_) => {
                        self.summary = None;
                        self.status = None;
                    }
                    Err(e) => self.status = Some(e.to_string()),
                }
            }
            BreathState::ExhaleHoldActive | BreathState::InhaleHoldActive => {
                self.controller.advance();
            }
            BreathState::Paused => {
                self.controller.resume();
                self.status = None;
            }
            BreathState::BreathingActive => {}
        }
    }

    fn end(&mut self) {
        if !self.controller.state().is_in_session() {
            return;
        }
        if self.confirm_end {
            self.confirm_end = false;
            self.controller.end_session();
        } else {
            self.confirm_end = true;
            self.status = Some("Press Esc again to end the session".to_string());
        }
    }

    fn after_transition(&mut self) {
        if self.controller.state() != BreathState::SessionComplete || self.summary.is_some() {
            return;
        }
        if let Some(record) = self.controller.machine().finished_record() {
            self.summary = Some(SessionSummary::from_record(&record));
        }
        self.status = match self.controller.last_persist() {
            Some(PersistOutcome::Saved { .. }) => Some("Session saved".to_string()),
            Some(PersistOutcome::Failed { error, .. }) => {
                Some(format!("Session not saved: {error}"))
            }
            None => None,
        };
    }
}
