//! Training session command.
//!
//! Resolves session settings from the config and command-line overrides,
//! then hands the terminal to the trainer.

use std::time::Duration;

use colored::Colorize;
use tracing::{info, warn};

use crate::breath::format::parse_phase_duration;
use crate::breath::{
    BreathSettings, Pace, PacePreset, PersistOutcome, SessionController, SqliteSessionStore,
    SystemClock, Ticker,
};
use crate::cli::args::{OutputFormat, TrainArgs};
use crate::config::{BreathConfig, Config};
use crate::error::BreathError;
use crate::output::{format_summary, to_json};
use crate::tui::{self, App};

/// Execute the train command.
///
/// # Errors
///
/// Returns an error if the settings are invalid, the database cannot be
/// opened, or the terminal fails.
pub fn train(args: &TrainArgs, config: &Config, format: OutputFormat) -> Result<String, BreathError> {
    let settings = resolve_settings(args, &config.breath).inspect_err(|e| {
        warn!(error = %e, "session settings rejected");
    })?;
    let store = SqliteSessionStore::new()?;
    let ticker = Ticker::new(Duration::from_millis(config.breath.frame_interval_ms.max(1)));

    info!(
        pace = settings.pace.preset.as_str(),
        inhale_ms = settings.inhale_ms(),
        exhale_ms = settings.exhale_ms(),
        breaths = settings.breaths_per_cycle,
        cycles = settings.cycles_target,
        "opening trainer"
    );

    let controller = SessionController::new(SystemClock::new(), store, ticker);
    let app = tui::run(App::new(controller, settings))?;

    let Some(summary) = app.summary.as_ref() else {
        return match format {
            OutputFormat::Pretty => Ok("No session finished.".dimmed().to_string()),
            OutputFormat::Json => to_json(&serde_json::Value::Null),
        };
    };

    let mut output = format_summary(summary, format)?;
    if format == OutputFormat::Pretty {
        match app.controller().last_persist() {
            Some(PersistOutcome::Saved { session_id }) => {
                output.push_str(&format!("\n{} {}", "Saved session".green(), session_id));
            }
            Some(PersistOutcome::Failed { error, .. }) => {
                output.push_str(&format!("\n{}: {error}", "Session not saved".red()));
            }
            None => {}
        }
    }
    Ok(output)
}

/// Build session settings from config defaults and command-line overrides.
///
/// `--inhale`/`--exhale` switch to a custom pace, filling the other phase
/// from the otherwise selected pace.
///
/// # Errors
///
/// Returns `BreathError::Parse` for an unknown pace or unreadable duration,
/// and `BreathError::InvalidSettings` if the result fails validation.
pub fn resolve_settings(
    args: &TrainArgs,
    defaults: &BreathConfig,
) -> Result<BreathSettings, BreathError> {
    let mut settings = defaults.to_settings();

    if let Some(name) = &args.pace {
        let preset = PacePreset::parse(name).ok_or_else(|| {
            BreathError::Parse(format!(
                "Unknown pace: {name}. Supported: slow, medium, fast, custom"
            ))
        })?;
        settings.pace = match preset {
            PacePreset::Custom => Pace::custom(defaults.custom_inhale_ms, defaults.custom_exhale_ms),
            preset => Pace::preset(preset),
        };
    }

    if args.inhale.is_some() || args.exhale.is_some() {
        let inhale = match &args.inhale {
            Some(s) => phase_duration("inhale", s)?,
            None => settings.pace.inhale_ms,
        };
        let exhale = match &args.exhale {
            Some(s) => phase_duration("exhale", s)?,
            None => settings.pace.exhale_ms,
        };
        settings.pace = Pace::custom(inhale, exhale);
    }

    if let Some(breaths) = args.breaths {
        settings.breaths_per_cycle = breaths;
    }
    if let Some(cycles) = args.cycles {
        settings.cycles_target = cycles;
    }
    settings.motion_reduced |= args.reduced_motion;

    settings.validate()?;
    Ok(settings)
}

fn phase_duration(phase: &str, value: &str) -> Result<u32, BreathError> {
    parse_phase_duration(value).ok_or_else(|| {
        BreathError::Parse(format!(
            "Invalid {phase} duration: {value}. Use e.g. 4s, 4.5s or 1500ms"
        ))
    })
}
