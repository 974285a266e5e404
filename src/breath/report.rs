//! Breath session reports.
//!
//! Aggregates stored sessions over a period: hold records, time spent,
//! a per-day breakdown and the current practice streak.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{format_duration_ms, format_hold_ms};
use super::record::SessionRecord;
use super::storage::SqliteSessionStore;
use super::summary::mean;
use crate::error::BreathError;

/// Report time period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPeriod {
    /// Today only
    Today,
    /// Last 7 days
    #[default]
    Week,
    /// Last 30 days
    Month,
    /// All time
    AllTime,
}

impl ReportPeriod {
    /// Half-open range `[start, end)` of local days covering this period,
    /// ending with `today`.
    #[must_use]
    pub fn date_range(&self, today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let first_day = match self {
            Self::Today => today,
            Self::Week => today - Days::new(6),
            Self::Month => today - Days::new(29),
            Self::AllTime => NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(today),
        };
        let end_day = today.succ_opt().unwrap_or(today);
        (start_of(first_day), start_of(end_day))
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Week => "This Week",
            Self::Month => "This Month",
            Self::AllTime => "All Time",
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = BreathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" | "t" | "d" => Ok(Self::Today),
            "week" | "w" | "7d" => Ok(Self::Week),
            "month" | "m" | "30d" => Ok(Self::Month),
            "all" | "alltime" | "all-time" => Ok(Self::AllTime),
            other => Err(BreathError::Parse(format!(
                "unknown period '{other}' (expected today, week, month or all)"
            ))),
        }
    }
}

/// Local midnight at the start of `day`, in UTC.
fn start_of(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(Local)
        .earliest()
        .map_or_else(|| midnight.and_utc(), |t| t.with_timezone(&Utc))
}

/// Breath report data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathReport {
    /// Report period name
    pub period: String,
    /// Sessions in the period
    pub sessions: u32,
    /// Sessions that reached their cycle target
    pub completed_sessions: u32,
    /// Cycles completed across all sessions
    pub cycles_completed: u32,
    /// Paced breathing time
    pub total_breath_time_ms: u64,
    /// Hold time, both holds
    pub total_hold_time_ms: u64,
    /// Longest exhale hold
    pub best_exhale_hold_ms: u64,
    /// Longest inhale hold
    pub best_inhale_hold_ms: u64,
    /// Mean exhale hold across all cycles
    pub average_exhale_hold_ms: u64,
    /// Mean inhale hold across all cycles
    pub average_inhale_hold_ms: u64,
    /// Per-day breakdown, newest first
    pub daily: Vec<DailyBreathing>,
    /// Consecutive days with at least one completed cycle, ending today or yesterday
    pub streak_days: u32,
}

/// Activity on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBreathing {
    /// Date
    pub date: String,
    /// Sessions that day
    pub sessions: u32,
    /// Cycles completed that day
    pub cycles: u32,
    /// Longest exhale hold that day
    pub best_exhale_hold_ms: u64,
}

impl BreathReport {
    /// Generate a report for the given period from stored sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions cannot be read.
    pub fn generate(storage: &SqliteSessionStore, period: ReportPeriod) -> Result<Self, BreathError> {
        let today = Local::now().date_naive();
        let (start, end) = period.date_range(today);
        let sessions = storage.get_range(start, end)?;
        Ok(Self::from_sessions(&sessions, period, today))
    }

    /// Build a report from sessions already loaded.
    #[must_use]
    pub fn from_sessions(sessions: &[SessionRecord], period: ReportPeriod, today: NaiveDate) -> Self {
        let cycles: Vec<_> = sessions.iter().flat_map(|s| s.cycles.iter()).collect();
        let exhale: Vec<u64> = cycles.iter().map(|c| c.exhale_hold.duration_ms).collect();
        let inhale: Vec<u64> = cycles.iter().map(|c| c.inhale_hold.duration_ms).collect();

        let mut daily_map: BTreeMap<NaiveDate, DailyBreathing> = BTreeMap::new();
        for session in sessions {
            let date = session.started_at_local().date_naive();
            let entry = daily_map.entry(date).or_insert_with(|| DailyBreathing {
                date: date.to_string(),
                sessions: 0,
                cycles: 0,
                best_exhale_hold_ms: 0,
            });
            entry.sessions += 1;
            entry.cycles += session.cycles_completed;
            let best = session
                .cycles
                .iter()
                .map(|c| c.exhale_hold.duration_ms)
                .max()
                .unwrap_or(0);
            entry.best_exhale_hold_ms = entry.best_exhale_hold_ms.max(best);
        }

        let practiced: Vec<NaiveDate> = daily_map
            .iter()
            .filter(|(_, day)| day.cycles > 0)
            .map(|(date, _)| *date)
            .collect();
        let streak_days = calculate_streak(&practiced, today);

        Self {
            period: period.display_name().to_string(),
            sessions: count(sessions.len()),
            completed_sessions: count(sessions.iter().filter(|s| s.is_complete()).count()),
            cycles_completed: sessions.iter().map(|s| s.cycles_completed).sum(),
            total_breath_time_ms: cycles.iter().map(|c| c.breathing.actual_duration_ms).sum(),
            total_hold_time_ms: cycles.iter().map(|c| c.total_hold_ms()).sum(),
            best_exhale_hold_ms: exhale.iter().copied().max().unwrap_or(0),
            best_inhale_hold_ms: inhale.iter().copied().max().unwrap_or(0),
            average_exhale_hold_ms: mean(&exhale),
            average_inhale_hold_ms: mean(&inhale),
            daily: daily_map.into_values().rev().collect(),
            streak_days,
        }
    }

    /// Format the report for display.
    #[must_use]
    pub fn format(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Breath Report: {}", self.period));
        lines.push("═".repeat(50));
        lines.push(String::new());

        lines.push("Summary".to_string());
        lines.push("─".repeat(40));
        lines.push(format!(
            "  Sessions:            {} ({} complete)",
            self.sessions, self.completed_sessions
        ));
        lines.push(format!("  Cycles completed:    {}", self.cycles_completed));
        lines.push(format!(
            "  Breathing time:      {}",
            format_duration_ms(self.total_breath_time_ms)
        ));
        lines.push(format!(
            "  Hold time:           {}",
            format_duration_ms(self.total_hold_time_ms)
        ));
        lines.push(format!("  Current streak:      {} days", self.streak_days));
        lines.push(String::new());

        if self.cycles_completed > 0 {
            lines.push("Holds".to_string());
            lines.push("─".repeat(40));
            lines.push(format!(
                "  Best exhale hold:    {}",
                format_hold_ms(self.best_exhale_hold_ms)
            ));
            lines.push(format!(
                "  Best inhale hold:    {}",
                format_hold_ms(self.best_inhale_hold_ms)
            ));
            lines.push(format!(
                "  Average exhale hold: {}",
                format_hold_ms(self.average_exhale_hold_ms)
            ));
            lines.push(format!(
                "  Average inhale hold: {}",
                format_hold_ms(self.average_inhale_hold_ms)
            ));
            lines.push(String::new());
        }

        if !self.daily.is_empty() {
            lines.push("Recent Days".to_string());
            lines.push("─".repeat(40));

            for day in self.daily.iter().take(7) {
                lines.push(format!(
                    "  {} {:>2} cycles ({} sessions)  best {}",
                    day.date,
                    day.cycles,
                    day.sessions,
                    format_hold_ms(day.best_exhale_hold_ms)
                ));
            }
        }

        lines.join("\n")
    }

    /// Total time spent in sessions, breathing and holding.
    #[must_use]
    pub const fn total_time(&self) -> Duration {
        Duration::from_millis(self.total_breath_time_ms + self.total_hold_time_ms)
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Count consecutive practice days back from `today`.
///
/// A streak that has not been extended today still counts if yesterday was
/// a practice day.
fn calculate_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut check_date = today;

    if !dates.contains(&today) {
        let Some(yesterday) = today.pred_opt() else {
            return 0;
        };
        if !dates.contains(&yesterday) {
            return 0;
        }
        check_date = yesterday;
    }

    let mut streak = 0;
    while dates.contains(&check_date) {
        streak += 1;
        match check_date.pred_opt() {
            Some(prev) => check_date = prev,
            None => break,
        }
    }

    streak
}
