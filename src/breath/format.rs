//! Duration formatting and parsing for holds and sessions.

use std::time::Duration;

/// Format a hold as `M:SS.t`, e.g. `1:07.4`.
#[must_use]
pub fn format_hold(d: Duration) -> String {
    let tenths = d.as_millis() / 100;
    let minutes = tenths / 600;
    let seconds = (tenths / 10) % 60;
    let tenth = tenths % 10;
    format!("{minutes}:{seconds:02}.{tenth}")
}

/// Format a millisecond count as a hold.
#[must_use]
pub fn format_hold_ms(ms: u64) -> String {
    format_hold(Duration::from_millis(ms))
}

/// Format a duration as MM:SS.
#[must_use]
pub fn format_duration_mmss(d: Duration) -> String {
    let total_seconds = d.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Format a duration as a human-readable string.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.as_secs() / 60;

    if total_minutes < 1 {
        let seconds = d.as_secs();
        return format!("{} second{}", seconds, plural(seconds));
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        if minutes > 0 {
            format!(
                "{} hour{}, {} minute{}",
                hours,
                plural(hours),
                minutes,
                plural(minutes)
            )
        } else {
            format!("{} hour{}", hours, plural(hours))
        }
    } else {
        format!("{} minute{}", minutes, plural(minutes))
    }
}

/// Format a millisecond count as a human-readable string.
#[must_use]
pub fn format_duration_ms(ms: u64) -> String {
    format_duration(Duration::from_millis(ms))
}

const fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Parse a phase duration like "4000", "4s", "4.5s" or "1500ms" into milliseconds.
///
/// A bare number is taken as milliseconds. Returns `None` for zero,
/// negative or unparsable input.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_phase_duration(s: &str) -> Option<u32> {
    let s = s.trim().to_lowercase();

    let ms = if let Some(num) = s.strip_suffix("ms") {
        num.trim().parse::<u32>().ok()?
    } else if let Some(num) = s.strip_suffix('s') {
        let secs: f64 = num.trim().parse().ok()?;
        if !secs.is_finite() || secs <= 0.0 || secs > f64::from(u32::MAX) / 1000.0 {
            return None;
        }
        (secs * 1000.0).round() as u32
    } else {
        s.parse::<u32>().ok()?
    };

    (ms > 0).then_some(ms)
}

/// Render a progress bar.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
