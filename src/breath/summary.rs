//! Per-session summary statistics.

use serde::{Deserialize, Serialize};

use super::record::SessionRecord;

/// Aggregate statistics for one finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: String,
    /// Longest exhale hold in milliseconds
    pub longest_exhale_hold_ms: u64,
    /// Longest inhale hold in milliseconds
    pub longest_inhale_hold_ms: u64,
    /// Mean exhale hold in milliseconds
    pub average_exhale_hold_ms: u64,
    /// Mean inhale hold in milliseconds
    pub average_inhale_hold_ms: u64,
    /// Paced breathing time across all cycles
    pub total_breath_time_ms: u64,
    /// Hold time across all cycles, both holds
    pub total_hold_time_ms: u64,
    /// Cycles completed
    pub cycles_completed: u32,
    /// Targeted cycles that were not completed
    pub cycles_aborted: u32,
}

impl SessionSummary {
    /// Compute the summary of a session record.
    #[must_use]
    pub fn from_record(record: &SessionRecord) -> Self {
        let exhale: Vec<u64> = record
            .cycles
            .iter()
            .map(|c| c.exhale_hold.duration_ms)
            .collect();
        let inhale: Vec<u64> = record
            .cycles
            .iter()
            .map(|c| c.inhale_hold.duration_ms)
            .collect();

        Self {
            session_id: record.session_id.clone(),
            longest_exhale_hold_ms: exhale.iter().copied().max().unwrap_or(0),
            longest_inhale_hold_ms: inhale.iter().copied().max().unwrap_or(0),
            average_exhale_hold_ms: mean(&exhale),
            average_inhale_hold_ms: mean(&inhale),
            total_breath_time_ms: record
                .cycles
                .iter()
                .map(|c| c.breathing.actual_duration_ms)
                .sum(),
            total_hold_time_ms: record.cycles.iter().map(|c| c.total_hold_ms()).sum(),
            cycles_completed: record.cycles_completed,
            cycles_aborted: record
                .settings
                .cycles_target
                .saturating_sub(record.cycles_completed),
        }
    }
}

/// Rounded mean of the values, zero when empty.
pub(crate) fn mean(values: &[u64]) -> u64 {
    let Ok(count) = u64::try_from(values.len()) else {
        return 0;
    };
    if count == 0 {
        return 0;
    }
    let total: u64 = values.iter().sum();
    (total + count / 2) / count
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::breath::record::fixtures::{cycle, session};

    #[test]
    fn test_summary_of_partial_session() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let record = session(
            "abc",
            start,
            vec![cycle(1, 40_000, 15_000), cycle(2, 61_000, 12_000)],
        );

        let summary = SessionSummary::from_record(&record);
        assert_eq!(summary.longest_exhale_hold_ms, 61_000);
        assert_eq!(summary.longest_inhale_hold_ms, 15_000);
        assert_eq!(summary.average_exhale_hold_ms, 50_500);
        assert_eq!(summary.average_inhale_hold_ms, 13_500);
        assert_eq!(summary.total_breath_time_ms, 180_000);
        assert_eq!(summary.total_hold_time_ms, 128_000);
        assert_eq!(summary.cycles_completed, 2);
        assert_eq!(summary.cycles_aborted, 1);
    }

    #[test]
    fn test_summary_of_empty_session() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let summary = SessionSummary::from_record(&session("abc", start, Vec::new()));
        assert_eq!(summary.longest_exhale_hold_ms, 0);
        assert_eq!(summary.average_inhale_hold_ms, 0);
        assert_eq!(summary.cycles_aborted, 3);
    }

    #[test]
    fn test_mean_rounds() {
        assert_eq!(mean(&[1, 2]), 2);
        assert_eq!(mean(&[10, 10, 11]), 10);
        assert_eq!(mean(&[]), 0);
    }
}
