//! Session history commands.
//!
//! Listing, inspecting, deleting and reporting on saved sessions.

use colored::Colorize;
use serde_json::json;
use tracing::info;

use crate::breath::{BreathReport, ReportPeriod, SqliteSessionStore};
use crate::cli::args::OutputFormat;
use crate::error::BreathError;
use crate::output::{format_paces, format_report, format_session, format_sessions, to_json};

/// List recent sessions.
///
/// # Errors
///
/// Returns an error if the database query or output formatting fails.
pub fn history(
    storage: &SqliteSessionStore,
    limit: usize,
    format: OutputFormat,
) -> Result<String, BreathError> {
    let sessions = storage.get_recent(limit)?;
    format_sessions(&sessions, format)
}

/// Show one session by ID or unique prefix.
///
/// # Errors
///
/// Returns `BreathError::NotFound` if no session matches, or a parse error
/// if the prefix is ambiguous.
pub fn show(storage: &SqliteSessionStore, id: &str, format: OutputFormat) -> Result<String, BreathError> {
    let session = storage.find(id)?;
    format_session(&session, format)
}

/// Delete one session by ID or unique prefix.
///
/// # Errors
///
/// Returns `BreathError::NotFound` if no session matches.
pub fn delete(storage: &SqliteSessionStore, id: &str, format: OutputFormat) -> Result<String, BreathError> {
    let session = storage.find(id)?;
    if !storage.delete(&session.session_id)? {
        return Err(BreathError::NotFound(format!("Session {id}")));
    }
    info!(session_id = %session.session_id, "session deleted");

    match format {
        OutputFormat::Json => to_json(&json!({ "deleted": session.session_id })),
        OutputFormat::Pretty => Ok(format!(
            "{} {} ({})",
            "Deleted session".green(),
            session.session_id,
            session.started_at_local().format("%Y-%m-%d %H:%M")
        )),
    }
}

/// Generate a report for a period.
///
/// # Errors
///
/// Returns a parse error for an unknown period, or an error if the database
/// query fails.
pub fn report(storage: &SqliteSessionStore, period: &str, format: OutputFormat) -> Result<String, BreathError> {
    let period: ReportPeriod = period.parse()?;
    let report = BreathReport::generate(storage, period)?;
    format_report(&report, format)
}

/// List the pace presets.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn paces(format: OutputFormat) -> Result<String, BreathError> {
    format_paces(format)
}
