//! Configuration settings for breathwork.
//!
//! Settings are loaded from `~/.breathwork/config.yaml`.

use serde::{Deserialize, Serialize};

use crate::breath::settings::{BreathSettings, Pace, PacePreset};
use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::BreathError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Session defaults.
    pub breath: BreathConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Log level written to the log file (`error`, `warn`, `info`, `debug`, `trace`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Defaults for new breath sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BreathConfig {
    /// Pace preset.
    #[serde(default)]
    pub pace: PacePreset,
    /// Inhale length for the custom pace, in milliseconds.
    #[serde(default = "default_phase_ms")]
    pub custom_inhale_ms: u32,
    /// Exhale length for the custom pace, in milliseconds.
    #[serde(default = "default_phase_ms")]
    pub custom_exhale_ms: u32,
    /// Inhale/exhale pairs per cycle.
    #[serde(default = "default_breaths_per_cycle")]
    pub breaths_per_cycle: u32,
    /// Cycles per session.
    #[serde(default = "default_cycles_target")]
    pub cycles_target: u32,
    /// Prefer static visuals over animation.
    #[serde(default)]
    pub motion_reduced: bool,
    /// Trainer frame interval in milliseconds.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_phase_ms() -> u32 {
    3000
}

const fn default_breaths_per_cycle() -> u32 {
    40
}

const fn default_cycles_target() -> u32 {
    3
}

const fn default_frame_interval() -> u64 {
    16
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            log_level: default_log_level(),
        }
    }
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            pace: PacePreset::default(),
            custom_inhale_ms: default_phase_ms(),
            custom_exhale_ms: default_phase_ms(),
            breaths_per_cycle: default_breaths_per_cycle(),
            cycles_target: default_cycles_target(),
            motion_reduced: false,
            frame_interval_ms: default_frame_interval(),
        }
    }
}

impl BreathConfig {
    /// Session settings described by this configuration.
    #[must_use]
    pub const fn to_settings(&self) -> BreathSettings {
        let pace = match self.pace {
            PacePreset::Custom => Pace::custom(self.custom_inhale_ms, self.custom_exhale_ms),
            preset => Pace::preset(preset),
        };
        BreathSettings {
            pace,
            breaths_per_cycle: self.breaths_per_cycle,
            cycles_target: self.cycles_target,
            motion_reduced: self.motion_reduced,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, BreathError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, BreathError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            BreathError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            BreathError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), BreathError> {
        std::fs::write(path, self.to_yaml()?).map_err(|e| {
            BreathError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Render the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, BreathError> {
        serde_yaml::to_string(self)
            .map_err(|e| BreathError::Config(format!("Failed to serialize config: {e}")))
    }
}
