use crate::ui::messages::{success, warning};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Directory collaborator table. Only the columns the engine reads.
fn create_students_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name    TEXT NOT NULL,
            chat_id      INTEGER,
            class_num    INTEGER,
            confirmed_at TEXT
        );
        "#,
    )?;
    Ok(())
}

fn create_trial_events_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS trial_events (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            name             TEXT NOT NULL,
            is_active        INTEGER NOT NULL DEFAULT 0 CHECK(is_active IN (0, 1)),
            max_reservations INTEGER NOT NULL DEFAULT 4 CHECK(max_reservations > 0),
            default_times    TEXT NOT NULL DEFAULT '[]',
            default_capacity INTEGER NOT NULL DEFAULT 45,
            campuses         TEXT NOT NULL DEFAULT '{}',
            created_at       TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_trial_events_single_active
            ON trial_events(is_active) WHERE is_active = 1;
        "#,
    )?;
    Ok(())
}

fn create_reservations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id     INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            event_id       INTEGER NOT NULL REFERENCES trial_events(id) ON DELETE CASCADE,
            subject        TEXT NOT NULL,
            campus         TEXT NOT NULL,
            exam_date      TEXT NOT NULL,
            exam_time      TEXT NOT NULL,
            created_at     TEXT NOT NULL,
            confirmed      INTEGER NOT NULL DEFAULT 0,
            confirmed_at   TEXT,
            attended       INTEGER NOT NULL DEFAULT 0,
            submitted_work INTEGER NOT NULL DEFAULT 0,
            UNIQUE(student_id, event_id, subject, campus, exam_date, exam_time)
        );

        CREATE INDEX IF NOT EXISTS idx_reservations_cell
            ON reservations(event_id, campus, exam_date, exam_time);
        CREATE INDEX IF NOT EXISTS idx_reservations_student
            ON reservations(student_id, event_id);
        "#,
    )?;
    Ok(())
}

/// Databases created before attendance tracking lack the two outcome
/// columns.
fn migrate_add_outcome_columns(conn: &Connection) -> Result<()> {
    for column in ["attended", "submitted_work"] {
        if !has_column(conn, "reservations", column)? {
            warning(format!("Adding '{}' column to reservations table...", column));
            conn.execute_batch(&format!(
                "ALTER TABLE reservations ADD COLUMN {} INTEGER NOT NULL DEFAULT 0;",
                column
            ))?;
            conn.execute(
                "INSERT INTO log (date, operation, target, message)
                 VALUES (?1, 'migrate_column', 'reservations', ?2)",
                [Utc::now().to_rfc3339(), format!("Added '{}' column", column)],
            )?;
            success(format!("'{}' column added.", column));
        }
    }
    Ok(())
}

/// Create missing tables and bring older schemas up to date. Idempotent.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;
    create_students_table(conn)?;
    create_trial_events_table(conn)?;

    if table_exists(conn, "reservations")? {
        migrate_add_outcome_columns(conn)?;
    }
    create_reservations_table(conn)?;

    Ok(())
}
