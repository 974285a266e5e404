//! Session storage.
//!
//! Persists finished breath sessions and their cycles to the local database.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::record::{BreathingRecord, CycleRecord, HoldRecord, SessionRecord};
use super::settings::{BreathSettings, Pace, PacePreset};
use crate::error::BreathError;
use crate::storage::Database;

/// Destination for finished sessions.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore {
    /// Persist a finished session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be written.
    fn save(&self, record: &SessionRecord) -> Result<(), BreathError>;
}

const SESSION_COLUMNS: &str = r"session_id, started_at, ended_at, pace, inhale_ms, exhale_ms,
       breaths_per_cycle, cycles_target, motion_reduced, cycles_completed";

/// `SQLite`-backed session store.
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    /// Open the store at the default database location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self, BreathError> {
        let db = Database::open()?;
        Ok(Self { db })
    }

    /// Create storage with an existing database connection.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace a session and its cycles.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is written in that case.
    pub fn upsert(&self, record: &SessionRecord) -> Result<(), BreathError> {
        let tx = self
            .db
            .connection()
            .unchecked_transaction()
            .map_err(|e| BreathError::Database(format!("Failed to begin transaction: {e}")))?;

        tx.execute(
            r"INSERT INTO breath_sessions
              (session_id, started_at, ended_at, pace, inhale_ms, exhale_ms,
               breaths_per_cycle, cycles_target, motion_reduced, cycles_completed)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
              ON CONFLICT(session_id) DO UPDATE SET
                started_at = excluded.started_at,
                ended_at = excluded.ended_at,
                pace = excluded.pace,
                inhale_ms = excluded.inhale_ms,
                exhale_ms = excluded.exhale_ms,
                breaths_per_cycle = excluded.breaths_per_cycle,
                cycles_target = excluded.cycles_target,
                motion_reduced = excluded.motion_reduced,
                cycles_completed = excluded.cycles_completed",
            params![
                record.session_id,
                fmt_ts(record.started_at),
                fmt_ts(record.ended_at),
                record.settings.pace.preset.as_str(),
                record.settings.pace.inhale_ms,
                record.settings.pace.exhale_ms,
                record.settings.breaths_per_cycle,
                record.settings.cycles_target,
                record.settings.motion_reduced,
                record.cycles_completed,
            ],
        )
        .map_err(|e| BreathError::Database(format!("Failed to save session: {e}")))?;

        tx.execute(
            "DELETE FROM breath_cycles WHERE session_id = ?1",
            [&record.session_id],
        )
        .map_err(|e| BreathError::Database(format!("Failed to replace cycles: {e}")))?;

        for cycle in &record.cycles {
            tx.execute(
                r"INSERT INTO breath_cycles
                  (session_id, cycle_index, target_breaths, actual_breaths,
                   breathing_start_at, breathing_end_at, breathing_duration_ms,
                   exhale_hold_start_at, exhale_hold_ms, inhale_hold_start_at, inhale_hold_ms)
                  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    record.session_id,
                    cycle.cycle_index,
                    cycle.breathing.target_breaths,
                    cycle.breathing.actual_breaths,
                    fmt_ts(cycle.breathing.start_at),
                    fmt_ts(cycle.breathing.end_at),
                    to_sql_ms(cycle.breathing.actual_duration_ms),
                    fmt_ts(cycle.exhale_hold.start_at),
                    to_sql_ms(cycle.exhale_hold.duration_ms),
                    fmt_ts(cycle.inhale_hold.start_at),
                    to_sql_ms(cycle.inhale_hold.duration_ms),
                ],
            )
            .map_err(|e| BreathError::Database(format!("Failed to save cycle: {e}")))?;
        }

        tx.commit()
            .map_err(|e| BreathError::Database(format!("Failed to commit session: {e}")))
    }

    /// Get a session by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, id: &str) -> Result<Option<SessionRecord>, BreathError> {
        let conn = self.db.connection();

        let session = conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM breath_sessions WHERE session_id = ?1"),
                [id],
                row_to_session,
            )
            .optional()
            .map_err(|e| BreathError::Database(format!("Failed to query session: {e}")))?;

        session.map(|s| with_cycles(conn, s)).transpose()
    }

    /// Find a session by full ID or unique ID prefix.
    ///
    /// # Errors
    ///
    /// Returns `BreathError::NotFound` if nothing matches, or
    /// `BreathError::Parse` if the prefix matches more than one session.
    pub fn find(&self, id_or_prefix: &str) -> Result<SessionRecord, BreathError> {
        if let Some(session) = self.get(id_or_prefix)? {
            return Ok(session);
        }

        let conn = self.db.connection();
        let pattern = format!("{}%", escape_like(id_or_prefix));
        let mut stmt = conn
            .prepare(
                r"SELECT session_id FROM breath_sessions
                  WHERE session_id LIKE ?1 ESCAPE '\'
                  LIMIT 2",
            )
            .map_err(|e| BreathError::Database(format!("Failed to prepare query: {e}")))?;
        let ids = stmt
            .query_map([pattern], |row| row.get::<_, String>(0))
            .map_err(|e| BreathError::Database(format!("Failed to query sessions: {e}")))?
            .collect::<Result<Vec<_>, _>>()?;

        match ids.as_slice() {
            [] => Err(BreathError::NotFound(format!("session {id_or_prefix}"))),
            [id] => self
                .get(id)?
                .ok_or_else(|| BreathError::NotFound(format!("session {id_or_prefix}"))),
            _ => Err(BreathError::Parse(format!(
                "session id prefix '{id_or_prefix}' is ambiguous"
            ))),
        }
    }

    /// Get recent sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_recent(&self, limit: usize) -> Result<Vec<SessionRecord>, BreathError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM breath_sessions
                 ORDER BY started_at DESC
                 LIMIT ?1"
            ))
            .map_err(|e| BreathError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([limit], row_to_session)
            .map_err(|e| BreathError::Database(format!("Failed to query sessions: {e}")))?;

        let mut sessions = Vec::new();
        for row in rows {
            let session = row.map_err(|e| BreathError::Database(e.to_string()))?;
            sessions.push(with_cycles(conn, session)?);
        }

        Ok(sessions)
    }

    /// Get sessions started in `[start, end)`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>, BreathError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM breath_sessions
                 WHERE started_at >= ?1 AND started_at < ?2
                 ORDER BY started_at DESC"
            ))
            .map_err(|e| BreathError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([fmt_ts(start), fmt_ts(end)], row_to_session)
            .map_err(|e| BreathError::Database(format!("Failed to query sessions: {e}")))?;

        let mut sessions = Vec::new();
        for row in rows {
            let session = row.map_err(|e| BreathError::Database(e.to_string()))?;
            sessions.push(with_cycles(conn, session)?);
        }

        Ok(sessions)
    }

    /// Delete a session and its cycles.
    ///
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, id: &str) -> Result<bool, BreathError> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM breath_sessions WHERE session_id = ?1", [id])
            .map_err(|e| BreathError::Database(format!("Failed to delete session: {e}")))?;

        Ok(rows > 0)
    }

    /// Count stored sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<u64, BreathError> {
        let count: i64 = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM breath_sessions", [], |row| row.get(0))
            .map_err(|e| BreathError::Database(format!("Failed to count sessions: {e}")))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl SessionStore for SqliteSessionStore {
    fn save(&self, record: &SessionRecord) -> Result<(), BreathError> {
        self.upsert(record)
    }
}

fn with_cycles(conn: &Connection, mut session: SessionRecord) -> Result<SessionRecord, BreathError> {
    let mut stmt = conn
        .prepare(
            r"SELECT cycle_index, target_breaths, actual_breaths,
                     breathing_start_at, breathing_end_at, breathing_duration_ms,
                     exhale_hold_start_at, exhale_hold_ms, inhale_hold_start_at, inhale_hold_ms
              FROM breath_cycles
              WHERE session_id = ?1
              ORDER BY cycle_index",
        )
        .map_err(|e| BreathError::Database(format!("Failed to prepare query: {e}")))?;

    session.cycles = stmt
        .query_map([&session.session_id], row_to_cycle)
        .map_err(|e| BreathError::Database(format!("Failed to query cycles: {e}")))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| BreathError::Database(e.to_string()))?;

    Ok(session)
}

/// Convert a database row to a `SessionRecord` without its cycles.
fn row_to_session(row: &Row<'_>) -> Result<SessionRecord, rusqlite::Error> {
    let preset_str: String = row.get(3)?;
    let preset = PacePreset::parse(&preset_str).unwrap_or(PacePreset::Custom);

    Ok(SessionRecord {
        session_id: row.get(0)?,
        started_at: timestamp(row, 1)?,
        ended_at: timestamp(row, 2)?,
        settings: BreathSettings {
            pace: Pace {
                preset,
                inhale_ms: row.get(4)?,
                exhale_ms: row.get(5)?,
            },
            breaths_per_cycle: row.get(6)?,
            cycles_target: row.get(7)?,
            motion_reduced: row.get(8)?,
        },
        cycles: Vec::new(),
        cycles_completed: row.get(9)?,
    })
}

/// Convert a database row to a `CycleRecord`.
fn row_to_cycle(row: &Row<'_>) -> Result<CycleRecord, rusqlite::Error> {
    Ok(CycleRecord {
        cycle_index: row.get(0)?,
        breathing: BreathingRecord {
            target_breaths: row.get(1)?,
            actual_breaths: row.get(2)?,
            start_at: timestamp(row, 3)?,
            end_at: timestamp(row, 4)?,
            actual_duration_ms: millis(row, 5)?,
        },
        exhale_hold: HoldRecord {
            start_at: timestamp(row, 6)?,
            duration_ms: millis(row, 7)?,
        },
        inhale_hold: HoldRecord {
            start_at: timestamp(row, 8)?,
            duration_ms: millis(row, 9)?,
        },
    })
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn fmt_ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn timestamp(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn millis(row: &Row<'_>, idx: usize) -> Result<u64, rusqlite::Error> {
    let v: i64 = row.get(idx)?;
    u64::try_from(v)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn to_sql_ms(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::breath::record::fixtures::{cycle, session};

    fn create_test_storage() -> SqliteSessionStore {
        let db = Database::open_in_memory().unwrap();
        SqliteSessionStore::with_database(db)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_save_and_get() {
        let storage = create_test_storage();
        let record = session(
            "session-one",
            at(1, 8),
            vec![cycle(1, 45_000, 15_000), cycle(2, 52_500, 14_000)],
        );

        storage.save(&record).unwrap();

        let loaded = storage.get("session-one").unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_get_missing() {
        let storage = create_test_storage();
        assert!(storage.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_save_is_upsert() {
        let storage = create_test_storage();
        let mut record = session("s", at(1, 8), vec![cycle(1, 10_000, 5_000)]);
        storage.save(&record).unwrap();

        record.cycles.push(cycle(2, 20_000, 6_000));
        record.cycles_completed = 2;
        record.settings.motion_reduced = true;
        storage.save(&record).unwrap();

        assert_eq!(storage.count().unwrap(), 1);
        let loaded = storage.get("s").unwrap().unwrap();
        assert_eq!(loaded.cycles.len(), 2);
        assert!(loaded.settings.motion_reduced);
    }

    #[test]
    fn test_session_without_cycles() {
        let storage = create_test_storage();
        let record = session("empty", at(1, 8), Vec::new());
        storage.save(&record).unwrap();

        let loaded = storage.get("empty").unwrap().unwrap();
        assert!(loaded.cycles.is_empty());
        assert_eq!(loaded.cycles_completed, 0);
    }

    #[test]
    fn test_get_recent() {
        let storage = create_test_storage();
        for day in 1..=5 {
            let record = session(&format!("s{day}"), at(day, 9), vec![cycle(1, 1_000, 1_000)]);
            storage.save(&record).unwrap();
        }

        let recent = storage.get_recent(3).unwrap();
        let ids: Vec<_> = recent.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["s5", "s4", "s3"]);
        assert_eq!(recent[0].cycles.len(), 1);
    }

    #[test]
    fn test_get_range() {
        let storage = create_test_storage();
        for day in 1..=5 {
            storage
                .save(&session(&format!("s{day}"), at(day, 9), Vec::new()))
                .unwrap();
        }

        let sessions = storage.get_range(at(2, 0), at(4, 0)).unwrap();
        let ids: Vec<_> = sessions.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["s3", "s2"]);
    }

    #[test]
    fn test_delete_cascades_cycles() {
        let storage = create_test_storage();
        storage
            .save(&session("gone", at(1, 8), vec![cycle(1, 1, 1), cycle(2, 1, 1)]))
            .unwrap();

        assert!(storage.delete("gone").unwrap());
        assert!(!storage.delete("gone").unwrap());
        assert!(storage.get("gone").unwrap().is_none());

        let orphans: i64 = storage
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM breath_cycles", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_find_by_prefix() {
        let storage = create_test_storage();
        storage.save(&session("abc123", at(1, 8), Vec::new())).unwrap();
        storage.save(&session("abd456", at(2, 8), Vec::new())).unwrap();

        assert_eq!(storage.find("abc").unwrap().session_id, "abc123");
        assert_eq!(storage.find("abd456").unwrap().session_id, "abd456");
        assert!(matches!(storage.find("ab"), Err(BreathError::Parse(_))));
        assert!(matches!(storage.find("zzz"), Err(BreathError::NotFound(_))));
        assert!(matches!(storage.find("a_c"), Err(BreathError::NotFound(_))));
    }

    #[test]
    fn test_timestamps_survive_round_trip() {
        let storage = create_test_storage();
        let started = at(1, 8) + Duration::milliseconds(1234);
        let mut record = session("ms", started, Vec::new());
        record.ended_at = started + Duration::milliseconds(98_765);
        storage.save(&record).unwrap();

        let loaded = storage.get("ms").unwrap().unwrap();
        assert_eq!(loaded.started_at, started);
        assert_eq!(loaded.ended_at, record.ended_at);
    }
}
