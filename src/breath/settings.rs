//! Session settings and pace presets.
//!
//! Settings are read once when a session starts and never change while it
//! runs.

use serde::{Deserialize, Serialize};

use crate::error::BreathError;

/// Named breathing pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PacePreset {
    /// 5s in, 5s out
    Slow,
    /// 3s in, 3s out
    #[default]
    Medium,
    /// 2s in, 2s out
    Fast,
    /// User supplied durations
    Custom,
}

impl PacePreset {
    /// All presets, in display order.
    pub const ALL: [Self; 4] = [Self::Slow, Self::Medium, Self::Fast, Self::Custom];

    /// Parse a preset from its name or a short alias.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "slow" | "s" => Some(Self::Slow),
            "medium" | "med" | "m" => Some(Self::Medium),
            "fast" | "f" => Some(Self::Fast),
            "custom" | "c" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Inhale/exhale durations for the fixed presets, in milliseconds.
    ///
    /// `Custom` has no fixed durations.
    #[must_use]
    pub const fn durations_ms(&self) -> Option<(u32, u32)> {
        match self {
            Self::Slow => Some((5000, 5000)),
            Self::Medium => Some((3000, 3000)),
            Self::Fast => Some((2000, 2000)),
            Self::Custom => None,
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Medium => "Medium",
            Self::Fast => "Fast",
            Self::Custom => "Custom",
        }
    }

    /// Name used on the command line and in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Medium => "medium",
            Self::Fast => "fast",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for PacePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Inhale/exhale pacing for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pace {
    /// Which preset this pace came from
    pub preset: PacePreset,
    /// Inhale phase length in milliseconds
    pub inhale_ms: u32,
    /// Exhale phase length in milliseconds
    pub exhale_ms: u32,
}

impl Pace {
    /// Pace for a fixed preset.
    ///
    /// `Custom` falls back to the medium durations; use [`Pace::custom`] to
    /// supply explicit ones.
    #[must_use]
    pub const fn preset(preset: PacePreset) -> Self {
        let (inhale_ms, exhale_ms) = match preset.durations_ms() {
            Some(d) => d,
            None => (3000, 3000),
        };
        Self {
            preset,
            inhale_ms,
            exhale_ms,
        }
    }

    /// Custom pace with explicit durations.
    #[must_use]
    pub const fn custom(inhale_ms: u32, exhale_ms: u32) -> Self {
        Self {
            preset: PacePreset::Custom,
            inhale_ms,
            exhale_ms,
        }
    }

    /// Short label like `3s in • 3s out`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} in • {} out",
            format_seconds(self.inhale_ms),
            format_seconds(self.exhale_ms)
        )
    }
}

impl Default for Pace {
    fn default() -> Self {
        Self::preset(PacePreset::Medium)
    }
}

fn format_seconds(ms: u32) -> String {
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{:.1}s", f64::from(ms) / 1000.0)
    }
}

/// Settings for a breathing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathSettings {
    /// Inhale/exhale pacing
    pub pace: Pace,
    /// Inhale/exhale pairs before the hold sequence
    pub breaths_per_cycle: u32,
    /// Cycles before the session completes
    pub cycles_target: u32,
    /// Presentation hint only; timing ignores it
    pub motion_reduced: bool,
}

impl Default for BreathSettings {
    fn default() -> Self {
        Self {
            pace: Pace::default(),
            breaths_per_cycle: 40,
            cycles_target: 3,
            motion_reduced: false,
        }
    }
}

impl BreathSettings {
    /// Inhale phase length in milliseconds.
    #[must_use]
    pub const fn inhale_ms(&self) -> u32 {
        self.pace.inhale_ms
    }

    /// Exhale phase length in milliseconds.
    #[must_use]
    pub const fn exhale_ms(&self) -> u32 {
        self.pace.exhale_ms
    }

    /// Check that every duration and count is positive.
    ///
    /// # Errors
    ///
    /// Returns `BreathError::InvalidSettings` naming the first offending field.
    pub fn validate(&self) -> Result<(), BreathError> {
        if self.pace.inhale_ms == 0 {
            return Err(BreathError::InvalidSettings(
                "inhale duration must be greater than zero".to_string(),
            ));
        }
        if self.pace.exhale_ms == 0 {
            return Err(BreathError::InvalidSettings(
                "exhale duration must be greater than zero".to_string(),
            ));
        }
        if self.breaths_per_cycle == 0 {
            return Err(BreathError::InvalidSettings(
                "breaths per cycle must be greater than zero".to_string(),
            ));
        }
        if self.cycles_target == 0 {
            return Err(BreathError::InvalidSettings(
                "cycles target must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
