use std::time::Duration;

use colored::Colorize;

use crate::breath::format::{
    format_duration_mmss, format_duration_ms, format_hold_ms, render_progress_bar,
};
use crate::breath::{BreathReport, Pace, PacePreset, SessionRecord, SessionSummary};

fn session_duration(session: &SessionRecord) -> String {
    let d = session.duration().to_std().unwrap_or(Duration::ZERO);
    format_duration_mmss(d)
}

fn cycles_label(session: &SessionRecord) -> String {
    format!(
        "{}/{} cycles",
        session.cycles_completed, session.settings.cycles_target
    )
}

/// Format session history as a pretty table
pub fn format_sessions_pretty(sessions: &[SessionRecord]) -> String {
    if sessions.is_empty() {
        return "Breath Sessions (0)\n  No sessions yet. Run `breathwork train` to begin."
            .to_string();
    }

    let mut output = format!("Breath Sessions ({})\n", sessions.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for session in sessions {
        let icon = if session.is_complete() {
            "✓".green()
        } else {
            "◐".yellow()
        };
        let best = session
            .cycles
            .iter()
            .map(|c| c.exhale_hold.duration_ms)
            .max()
            .unwrap_or(0);

        output.push_str(&format!(
            "{} {}  {}  {}  best {}  {}\n",
            icon,
            session.short_id().dimmed(),
            session.started_at_local().format("%Y-%m-%d %H:%M"),
            cycles_label(session),
            format_hold_ms(best).magenta(),
            session_duration(session).dimmed()
        ));
    }

    output
}

/// Format a single session with its cycles
pub fn format_session_pretty(session: &SessionRecord) -> String {
    let status = if session.is_complete() {
        "complete".green()
    } else {
        "ended early".yellow()
    };

    let mut output = format!(
        "{} {}\n",
        "Breath session".bold(),
        session.started_at_local().format("%Y-%m-%d %H:%M")
    );
    output.push_str(&format!("  {}: {}\n", "ID".dimmed(), session.session_id));
    output.push_str(&format!("  {}: {}\n", "Status".dimmed(), status));
    output.push_str(&format!(
        "  {}: {} ({})\n",
        "Pace".dimmed(),
        session.settings.pace.preset,
        session.settings.pace.label()
    ));
    output.push_str(&format!(
        "  {}: {} per cycle\n",
        "Breaths".dimmed(),
        session.settings.breaths_per_cycle
    ));
    output.push_str(&format!("  {}: {}\n", "Cycles".dimmed(), cycles_label(session)));
    output.push_str(&format!(
        "  {}: {}\n",
        "Duration".dimmed(),
        session_duration(session)
    ));

    if session.cycles.is_empty() {
        output.push_str(&format!("\n  {}\n", "No completed cycles".dimmed()));
        return output;
    }

    let best = session
        .cycles
        .iter()
        .map(|c| c.exhale_hold.duration_ms)
        .max()
        .unwrap_or(0);

    output.push('\n');
    output.push_str(&format!(
        "  {:<6} {:<9} {:<10} {:<10}\n",
        "Cycle", "Breaths", "Exhale", "Inhale"
    ));
    output.push_str(&format!("  {}\n", "─".repeat(56)));

    for cycle in &session.cycles {
        #[allow(clippy::cast_precision_loss)]
        let relative = if best == 0 {
            0.0
        } else {
            cycle.exhale_hold.duration_ms as f64 / best as f64
        };
        output.push_str(&format!(
            "  {:<6} {:<9} {:<10} {:<10} {}\n",
            cycle.cycle_index,
            format!(
                "{}/{}",
                cycle.breathing.actual_breaths, cycle.breathing.target_breaths
            ),
            format_hold_ms(cycle.exhale_hold.duration_ms),
            format_hold_ms(cycle.inhale_hold.duration_ms),
            render_progress_bar(relative, 16).magenta()
        ));
    }

    output.push('\n');
    output.push_str(&format_summary_pretty(&SessionSummary::from_record(session)));
    output
}

/// Format a session summary
pub fn format_summary_pretty(summary: &SessionSummary) -> String {
    let mut output = format!("{}\n", "Summary".bold());
    output.push_str(&"─".repeat(40));
    output.push('\n');
    output.push_str(&format!(
        "  Cycles:              {} completed, {} not reached\n",
        summary.cycles_completed, summary.cycles_aborted
    ));
    output.push_str(&format!(
        "  Longest exhale hold: {}\n",
        format_hold_ms(summary.longest_exhale_hold_ms).magenta()
    ));
    output.push_str(&format!(
        "  Average exhale hold: {}\n",
        format_hold_ms(summary.average_exhale_hold_ms)
    ));
    output.push_str(&format!(
        "  Longest inhale hold: {}\n",
        format_hold_ms(summary.longest_inhale_hold_ms).blue()
    ));
    output.push_str(&format!(
        "  Average inhale hold: {}\n",
        format_hold_ms(summary.average_inhale_hold_ms)
    ));
    output.push_str(&format!(
        "  Breathing time:      {}\n",
        format_duration_ms(summary.total_breath_time_ms)
    ));
    output.push_str(&format!(
        "  Hold time:           {}\n",
        format_duration_ms(summary.total_hold_time_ms)
    ));
    output
}

/// Format a breath report
pub fn format_report_pretty(report: &BreathReport) -> String {
    report.format()
}

/// Format the pace presets
pub fn format_paces_pretty() -> String {
    let mut output = format!("Paces ({})\n", PacePreset::ALL.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for preset in PacePreset::ALL {
        let detail = match preset {
            PacePreset::Custom => "set --inhale and --exhale".to_string(),
            _ => Pace::preset(preset).label(),
        };
        output.push_str(&format!(
            "{:<8} {}\n",
            preset.as_str().bold(),
            detail.dimmed()
        ));
    }

    output
}
