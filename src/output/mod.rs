//! Output formatting for breathwork.
//!
//! This module provides formatters for displaying breath sessions in various formats.

mod json;
mod pretty;

use crate::breath::{BreathReport, SessionRecord, SessionSummary};
use crate::cli::args::OutputFormat;
use crate::error::BreathError;

pub use json::*;
pub use pretty::*;

/// Format session history based on output format
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_sessions(
    sessions: &[SessionRecord],
    format: OutputFormat,
) -> Result<String, BreathError> {
    match format {
        OutputFormat::Pretty => Ok(format_sessions_pretty(sessions)),
        OutputFormat::Json => format_sessions_json(sessions),
    }
}

/// Format a single session based on output format
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_session(session: &SessionRecord, format: OutputFormat) -> Result<String, BreathError> {
    match format {
        OutputFormat::Pretty => Ok(format_session_pretty(session)),
        OutputFormat::Json => format_session_json(session),
    }
}

/// Format a session summary based on output format
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_summary(summary: &SessionSummary, format: OutputFormat) -> Result<String, BreathError> {
    match format {
        OutputFormat::Pretty => Ok(format_summary_pretty(summary)),
        OutputFormat::Json => format_summary_json(summary),
    }
}

/// Format a breath report based on output format
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_report(report: &BreathReport, format: OutputFormat) -> Result<String, BreathError> {
    match format {
        OutputFormat::Pretty => Ok(format_report_pretty(report)),
        OutputFormat::Json => format_report_json(report),
    }
}

/// Format the pace presets based on output format
///
/// # Errors
///
/// Returns `BreathError::Parse` if JSON serialization fails.
pub fn format_paces(format: OutputFormat) -> Result<String, BreathError> {
    match format {
        OutputFormat::Pretty => Ok(format_paces_pretty()),
        OutputFormat::Json => format_paces_json(),
    }
}
