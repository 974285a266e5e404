//! Cycle and session records.
//!
//! A [`CycleRecord`] is built when a cycle's inhale hold ends and is never
//! modified afterwards. A [`SessionRecord`] is what the session store
//! receives once a session reaches its terminal state.

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};

use super::settings::BreathSettings;

/// Paced-breathing part of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingRecord {
    /// Breaths the settings asked for
    pub target_breaths: u32,
    /// Breaths actually taken
    pub actual_breaths: u32,
    /// When paced breathing began
    pub start_at: DateTime<Utc>,
    /// When paced breathing ended (the exhale hold began)
    pub end_at: DateTime<Utc>,
    /// Paced breathing time, excluding pauses
    pub actual_duration_ms: u64,
}

/// One breath hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldRecord {
    /// When the hold began
    pub start_at: DateTime<Utc>,
    /// Hold length, excluding pauses
    pub duration_ms: u64,
}

/// A completed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    /// 1-based cycle number
    pub cycle_index: u32,
    /// Paced breathing
    pub breathing: BreathingRecord,
    /// Hold after the final exhale
    pub exhale_hold: HoldRecord,
    /// Hold after the recovery inhale
    pub inhale_hold: HoldRecord,
}

impl CycleRecord {
    /// Combined length of both holds.
    #[must_use]
    pub const fn total_hold_ms(&self) -> u64 {
        self.exhale_hold.duration_ms + self.inhale_hold.duration_ms
    }
}

/// A finished session, complete or ended early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Opaque session identifier
    pub session_id: String,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// When the session reached its terminal state
    pub ended_at: DateTime<Utc>,
    /// Settings the session ran with
    pub settings: BreathSettings,
    /// Fully completed cycles, in completion order
    pub cycles: Vec<CycleRecord>,
    /// Number of completed cycles
    pub cycles_completed: u32,
}

impl SessionRecord {
    /// Wall-clock length of the session, pauses included.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.ended_at.signed_duration_since(self.started_at)
    }

    /// Whether every targeted cycle was completed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.cycles_completed >= self.settings.cycles_target
    }

    /// Get start time in local timezone.
    #[must_use]
    pub fn started_at_local(&self) -> DateTime<Local> {
        self.started_at.with_timezone(&Local)
    }

    /// Short form of the session id for tables.
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.session_id.get(..8).unwrap_or(&self.session_id)
    }
}
