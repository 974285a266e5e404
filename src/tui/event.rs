//! Event handling for the trainer.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::BreathError;

/// Action to take after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a session, end a hold, or resume.
    Primary,
    /// Pause or resume.
    TogglePause,
    /// End the session (asks for confirmation first).
    End,
    /// The terminal lost focus.
    FocusLost,
    /// Quit the trainer, saving an active session.
    Quit,
}

/// Map a key press to an action.
#[must_use]
pub fn key_action(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Primary),
        KeyCode::Char('p' | 'P') => Some(Action::TogglePause),
        KeyCode::Esc => Some(Action::End),
        KeyCode::Char('q' | 'Q') => Some(Action::Quit),
        _ => None,
    }
}

/// Wait for the next terminal event and map it to an action.
///
/// With `timeout` set, returns `None` if nothing arrives in time. Without
/// it, blocks until an event arrives.
///
/// # Errors
///
/// Returns an error if event polling fails.
pub fn next_action(timeout: Option<Duration>) -> Result<Option<Action>, BreathError> {
    if let Some(timeout) = timeout {
        if !event::poll(timeout)
            .map_err(|e| BreathError::Terminal(format!("Event poll failed: {e}")))?
        {
            return Ok(None);
        }
    }

    let event =
        event::read().map_err(|e| BreathError::Terminal(format!("Event read failed: {e}")))?;

    Ok(match event {
        Event::Key(key) => key_action(&key),
        Event::FocusLost => Some(Action::FocusLost),
        _ => None,
    })
}
