//! Configuration commands.

use colored::Colorize;
use serde_json::json;

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::BreathError;
use crate::output::to_json;

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written.
pub fn config(
    paths: &Paths,
    cmd: &ConfigCommands,
    format: OutputFormat,
) -> Result<String, BreathError> {
    match cmd {
        ConfigCommands::Show => {
            let config = Config::load_from_path(&paths.config_file)?;
            match format {
                OutputFormat::Json => to_json(&config),
                OutputFormat::Pretty => config.to_yaml(),
            }
        }

        ConfigCommands::Init { force } => init(paths, *force, format),

        ConfigCommands::Path => match format {
            OutputFormat::Json => to_json(&json!({
                "config": paths.config_file,
                "database": paths.database,
                "log": paths.log_file,
            })),
            OutputFormat::Pretty => Ok(paths.config_file.display().to_string()),
        },
    }
}

fn init(paths: &Paths, force: bool, format: OutputFormat) -> Result<String, BreathError> {
    if paths.config_file.exists() && !force {
        return Err(BreathError::Config(format!(
            "{} already exists (use --force to overwrite)",
            paths.config_file.display()
        )));
    }

    paths.ensure_dirs()?;
    Config::default().save_to_path(&paths.config_file)?;
    tracing::info!(path = %paths.config_file.display(), "wrote default config");

    match format {
        OutputFormat::Json => to_json(&json!({ "written": paths.config_file })),
        OutputFormat::Pretty => Ok(format!(
            "{} {}",
            "Wrote".green(),
            paths.config_file.display()
        )),
    }
}
