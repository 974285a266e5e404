//! Database migrations for breathwork.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::BreathError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, BreathError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| BreathError::Database(format!("Failed to get schema version: {e}")))
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), BreathError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| BreathError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), BreathError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(());
    }

    for version in (current + 1)..=CURRENT_VERSION {
        tracing::debug!(version, "running database migration");
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), BreathError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(BreathError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// Creates tables for:
/// - `breath_sessions`: one row per finished session, with its settings
/// - `breath_cycles`: completed cycles, removed with their session
fn migrate_v1(conn: &Connection) -> Result<(), BreathError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS breath_sessions (
            session_id TEXT PRIMARY KEY,
            started_at TEXT NOT NULL,
            ended_at TEXT NOT NULL,
            pace TEXT NOT NULL DEFAULT 'medium',
            inhale_ms INTEGER NOT NULL,
            exhale_ms INTEGER NOT NULL,
            breaths_per_cycle INTEGER NOT NULL,
            cycles_target INTEGER NOT NULL,
            motion_reduced INTEGER NOT NULL DEFAULT 0,
            cycles_completed INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_breath_sessions_started
        ON breath_sessions(started_at);

        CREATE TABLE IF NOT EXISTS breath_cycles (
            session_id TEXT NOT NULL
                REFERENCES breath_sessions(session_id) ON DELETE CASCADE,
            cycle_index INTEGER NOT NULL,
            target_breaths INTEGER NOT NULL,
            actual_breaths INTEGER NOT NULL,
            breathing_start_at TEXT NOT NULL,
            breathing_end_at TEXT NOT NULL,
            breathing_duration_ms INTEGER NOT NULL,
            exhale_hold_start_at TEXT NOT NULL,
            exhale_hold_ms INTEGER NOT NULL,
            inhale_hold_start_at TEXT NOT NULL,
            inhale_hold_ms INTEGER NOT NULL,
            PRIMARY KEY (session_id, cycle_index)
        );
        ",
    )
    .map_err(|e| BreathError::Database(format!("Migration v1 failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_v1() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();

        run(&conn).unwrap();

        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);

        conn.execute(
            "INSERT INTO breath_sessions
             (session_id, started_at, ended_at, inhale_ms, exhale_ms, breaths_per_cycle, cycles_target)
             VALUES ('abc', '2024-01-01T10:00:00.000Z', '2024-01-01T10:12:00.000Z', 3000, 3000, 40, 3)",
            [],
        )
        .unwrap();

        conn.execute(
            "INSERT INTO breath_cycles
             (session_id, cycle_index, target_breaths, actual_breaths,
              breathing_start_at, breathing_end_at, breathing_duration_ms,
              exhale_hold_start_at, exhale_hold_ms, inhale_hold_start_at, inhale_hold_ms)
             VALUES ('abc', 1, 40, 40, 'a', 'b', 240000, 'c', 60000, 'd', 15000)",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_cycles_require_session() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO breath_cycles
             (session_id, cycle_index, target_breaths, actual_breaths,
              breathing_start_at, breathing_end_at, breathing_duration_ms,
              exhale_hold_start_at, exhale_hold_ms, inhale_hold_start_at, inhale_hold_ms)
             VALUES ('missing', 1, 40, 40, 'a', 'b', 1, 'c', 1, 'd', 1)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_migration_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run(&conn).unwrap();
        run(&conn).unwrap();

        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_get_version_new_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_version(&conn).unwrap(), 0);
    }
}
