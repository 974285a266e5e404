//! JSON output formatting for breathwork.

use serde::Serialize;
use serde_json::json;

use crate::breath::{BreathReport, PacePreset, SessionRecord, SessionSummary};
use crate::error::BreathError;

/// Serialize any value as pretty JSON.
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, BreathError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Format session history as JSON
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_sessions_json(sessions: &[SessionRecord]) -> Result<String, BreathError> {
    let output = json!({
        "count": sessions.len(),
        "items": sessions
    });
    to_json(&output)
}

/// Format a single session, with its summary, as JSON
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_session_json(session: &SessionRecord) -> Result<String, BreathError> {
    let output = json!({
        "session": session,
        "summary": SessionSummary::from_record(session)
    });
    to_json(&output)
}

/// Format a session summary as JSON
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_summary_json(summary: &SessionSummary) -> Result<String, BreathError> {
    to_json(summary)
}

/// Format a breath report as JSON
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_report_json(report: &BreathReport) -> Result<String, BreathError> {
    to_json(report)
}

/// Format the pace presets as JSON
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_paces_json() -> Result<String, BreathError> {
    let items: Vec<_> = PacePreset::ALL
        .iter()
        .map(|preset| {
            let durations = preset.durations_ms();
            json!({
                "name": preset.as_str(),
                "inhaleMs": durations.map(|(inhale, _)| inhale),
                "exhaleMs": durations.map(|(_, exhale)| exhale),
            })
        })
        .collect();
    to_json(&json!({ "count": items.len(), "items": items }))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::breath::record::fixtures;

    #[test]
    fn test_format_sessions_json() {
        let started = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let sessions = vec![fixtures::session("abc", started, vec![fixtures::cycle(1, 60_000, 15_000)])];

        let output = format_sessions_json(&sessions).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["count"], 1);
        assert_eq!(value["items"][0]["sessionId"], "abc");
        assert_eq!(value["items"][0]["cycles"][0]["exhaleHold"]["durationMs"], 60_000);
    }

    #[test]
    fn test_format_session_json_includes_summary() {
        let started = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let session = fixtures::session(
            "abc",
            started,
            vec![fixtures::cycle(1, 60_000, 15_000), fixtures::cycle(2, 80_000, 15_000)],
        );

        let output = format_session_json(&session).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["summary"]["longestExhaleHoldMs"], 80_000);
        assert_eq!(value["summary"]["averageExhaleHoldMs"], 70_000);
    }

    #[test]
    fn test_format_paces_json() {
        let value: serde_json::Value = serde_json::from_str(&format_paces_json().unwrap()).unwrap();

        assert_eq!(value["count"], 4);
        assert_eq!(value["items"][0]["name"], "slow");
        assert_eq!(value["items"][0]["inhaleMs"], 5000);
        assert!(value["items"][3]["inhaleMs"].is_null());
    }
}
