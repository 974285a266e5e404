//! UI rendering for the trainer.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::breath::format::{format_hold, format_hold_ms, format_duration_ms};
use crate::breath::{BreathState, Clock, Phase, SessionStore, Snapshot};
use crate::tui::app::{App, KEY_HINTS};

/// Render the trainer UI.
pub fn render<C: Clock, S: SessionStore>(frame: &mut Frame<'_>, app: &App<C, S>) {
    let snap = app.snapshot();

    // Header, main panel, best holds, cycles table, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, &snap, chunks[0]);
    render_main(frame, app, &snap, chunks[1]);
    render_bests(frame, &snap, chunks[2]);
    render_cycles(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);
}

fn state_color(state: BreathState) -> Color {
    match state {
        BreathState::Idle => Color::White,
        BreathState::BreathingActive => Color::Cyan,
        BreathState::ExhaleHoldActive => Color::Magenta,
        BreathState::InhaleHoldActive => Color::Blue,
        BreathState::Paused => Color::Yellow,
        BreathState::SessionComplete => Color::Green,
    }
}

/// Render the header.
fn render_header(frame: &mut Frame<'_>, snap: &Snapshot, area: Rect) {
    let title = if snap.state == BreathState::Idle {
        " Breathwork ".to_string()
    } else {
        format!(
            " Breathwork · Cycle {} of {} · {} ",
            snap.current_cycle,
            snap.cycles_target,
            snap.state.display_name()
        )
    };

    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(state_color(snap.state))
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(state_color(snap.state))),
        );

    frame.render_widget(header, area);
}

/// Render the state-specific main panel.
fn render_main<C: Clock, S: SessionStore>(
    frame: &mut Frame<'_>,
    app: &App<C, S>,
    snap: &Snapshot,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    match snap.state {
        BreathState::Idle => {
            let settings = &app.settings;
            let lines = vec![
                Line::from(Span::styled(
                    "Ready",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(format!(
                    "{} pace ({}) · {} breaths · {} cycles",
                    settings.pace.preset,
                    settings.pace.label(),
                    settings.breaths_per_cycle,
                    settings.cycles_target
                )),
                Line::from(""),
                Line::from("Press Space to begin."),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        }
        BreathState::BreathingActive => {
            let phase = Paragraph::new(Span::styled(
                snap.phase.to_string(),
                Style::default()
                    .fg(match snap.phase {
                        Phase::Inhale => Color::Cyan,
                        Phase::Exhale => Color::LightBlue,
                    })
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center);
            frame.render_widget(phase, rows[0]);

            if app.settings.motion_reduced {
                let remaining = 1.0 - snap.phase_progress;
                frame.render_widget(
                    Paragraph::new(format!("{:.0}% of phase left", remaining * 100.0))
                        .alignment(Alignment::Center),
                    rows[1],
                );
            } else {
                frame.render_widget(
                    Gauge::default()
                        .gauge_style(Style::default().fg(Color::Cyan))
                        .ratio(snap.phase_progress.clamp(0.0, 1.0))
                        .label(""),
                    rows[1],
                );
            }

            frame.render_widget(
                Paragraph::new(format!(
                    "Breath {} / {}",
                    snap.breath_count.saturating_add(1).min(snap.breaths_per_cycle),
                    snap.breaths_per_cycle
                ))
                .alignment(Alignment::Center),
                rows[2],
            );
            frame.render_widget(
                Gauge::default()
                    .gauge_style(Style::default().fg(Color::DarkGray))
                    .ratio(snap.cycle_progress()),
                rows[3],
            );
        }
        BreathState::ExhaleHoldActive | BreathState::InhaleHoldActive => {
            let (title, hint) = if snap.state == BreathState::ExhaleHoldActive {
                ("Exhale Hold", "Hold with empty lungs. Press Space when you need to breathe in.")
            } else {
                ("Inhale Hold", "Hold a full breath. Press Space to release.")
            };
            let lines = vec![
                Line::from(Span::styled(
                    title,
                    Style::default()
                        .fg(state_color(snap.state))
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format_hold(snap.current_hold),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        }
        BreathState::Paused => {
            let lines = vec![
                Line::from(Span::styled(
                    "Paused",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(format!(
                    "Breath {} / {} · hold {}",
                    snap.breath_count,
                    snap.breaths_per_cycle,
                    format_hold(snap.current_hold)
                )),
                Line::from(""),
                Line::from("Press p or Space to resume, Esc to end."),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        }
        BreathState::SessionComplete => {
            let mut lines = vec![Line::from(Span::styled(
                "Session complete",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))];
            if let Some(summary) = &app.summary {
                lines.push(Line::from(format!(
                    "{} of {} cycles",
                    summary.cycles_completed,
                    summary.cycles_completed + summary.cycles_aborted
                )));
                lines.push(Line::from(format!(
                    "Longest exhale hold {} · average {}",
                    format_hold_ms(summary.longest_exhale_hold_ms),
                    format_hold_ms(summary.average_exhale_hold_ms)
                )));
                lines.push(Line::from(format!(
                    "Longest inhale hold {} · average {}",
                    format_hold_ms(summary.longest_inhale_hold_ms),
                    format_hold_ms(summary.average_inhale_hold_ms)
                )));
                lines.push(Line::from(format!(
                    "Breathing {} · holding {}",
                    format_duration_ms(summary.total_breath_time_ms),
                    format_duration_ms(summary.total_hold_time_ms)
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from("Press Space for another session, q to quit."));
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        }
    }
}

/// Render the best holds line.
fn render_bests(frame: &mut Frame<'_>, snap: &Snapshot, area: Rect) {
    let line = Line::from(vec![
        Span::styled("Best exhale ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_hold(snap.best_exhale_hold),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled("   Best inhale ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_hold(snap.best_inhale_hold),
            Style::default().fg(Color::Blue),
        ),
    ]);

    frame.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

/// Render the completed cycles table.
fn render_cycles<C: Clock, S: SessionStore>(frame: &mut Frame<'_>, app: &App<C, S>, area: Rect) {
    let rows: Vec<Row<'_>> = app
        .controller()
        .machine()
        .cycles()
        .iter()
        .map(|cycle| {
            Row::new(vec![
                Cell::from(cycle.cycle_index.to_string()),
                Cell::from(format!(
                    "{}/{}",
                    cycle.breathing.actual_breaths, cycle.breathing.target_breaths
                )),
                Cell::from(format_hold_ms(cycle.exhale_hold.duration_ms)),
                Cell::from(format_hold_ms(cycle.inhale_hold.duration_ms)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(
        Row::new(vec!["Cycle", "Breaths", "Exhale hold", "Inhale hold"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title(" Cycles ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    frame.render_widget(table, area);
}

/// Render the status bar.
fn render_status_bar<C: Clock, S: SessionStore>(
    frame: &mut Frame<'_>,
    app: &App<C, S>,
    area: Rect,
) {
    let status_text = app.status.as_deref().unwrap_or(KEY_HINTS);
    let status = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::breath::storage::MockSessionStore;
    use crate::breath::{BreathSettings, ManualClock, SessionController, Ticker};
    use crate::tui::event::Action;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_render_idle_and_breathing() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
        let controller =
            SessionController::new(clock.clone(), MockSessionStore::new(), Ticker::default());
        let mut app = App::new(controller, BreathSettings::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Press Space to begin."));
        assert!(text.contains("40 breaths"));

        app.apply(Action::Primary);
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Cycle 1 of 3"));
        assert!(text.contains("Inhale"));
        assert!(text.contains("Breath 1 / 40"));
    }
}
