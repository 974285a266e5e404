//! Terminal trainer for breathwork.
//!
//! A full-screen ratatui/crossterm front end for a [`SessionController`].
//! Frames run only while the controller's ticker holds a registration;
//! otherwise the loop just waits for input.

mod app;
mod event;
mod ui;

pub use app::App;
pub use event::Action;

use std::io;

use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::breath::{Clock, SessionStore};
use crate::error::BreathError;

/// Run the trainer until the user quits.
///
/// Returns the app so the caller can report on the last session.
///
/// # Errors
///
/// Returns an error if the terminal fails to initialize or draw.
pub fn run<C: Clock, S: SessionStore>(mut app: App<C, S>) -> Result<App<C, S>, BreathError> {
    enable_raw_mode()
        .map_err(|e| BreathError::Terminal(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)
        .map_err(|e| BreathError::Terminal(format!("Failed to setup terminal: {e}")))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)
        .map_err(|e| BreathError::Terminal(format!("Failed to create terminal: {e}")))?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )
    .ok();
    terminal.show_cursor().ok();

    result.map(|()| app)
}

/// Run the main loop.
///
/// Each pass schedules a frame before waiting for input, so input that
/// pauses or ends the session cancels the frame before it runs.
fn run_app<B: Backend, C: Clock, S: SessionStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<C, S>,
) -> Result<(), BreathError> {
    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| BreathError::Terminal(format!("Failed to draw: {e}")))?;

        let scheduled = app.schedule_frame();
        let timeout = app.controller().ticker().poll_timeout();

        if let Some(action) = event::next_action(timeout)? {
            app.apply(action);
        }

        if app.should_quit {
            break;
        }

        if let Some(tick) = scheduled {
            app.run_frame(&tick);
        }
    }

    Ok(())
}
