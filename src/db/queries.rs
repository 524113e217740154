//! Reservation store and event catalog persistence.
//!
//! Occupancy is never stored: every count here is a `COUNT(*)` over the live
//! reservation rows, and admission and the availability projection both go
//! through [`count_cell`].

use crate::errors::{AppError, AppResult};
use crate::models::reservation::{Outcome, Reservation, ReservationRequest};
use crate::models::slot::Cell;
use crate::models::trial_event::TrialEvent;
use crate::utils::time::{parse_stamp, to_stamp};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const RESERVATION_COLUMNS: &str = "id, student_id, event_id, subject, campus, exam_date, exam_time,
     created_at, confirmed, confirmed_at, attended, submitted_work";

const EVENT_COLUMNS: &str =
    "id, name, is_active, max_reservations, default_times, default_capacity, campuses, created_at";

/// Chronological order of `H:MM` labels; plain text order puts "12:00"
/// before "9:00".
pub const EXAM_TIME_ORDER: &str =
    "CAST(substr(exam_time, 1, instr(exam_time, ':') - 1) AS INTEGER), substr(exam_time, -2)";

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, Type::Text, Box::new(err))
}

fn date_to_sql(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

pub fn map_reservation(row: &Row) -> Result<Reservation> {
    let date_str: String = row.get("exam_date")?;
    let exam_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(5, AppError::InvalidDate(date_str.clone())))?;

    let created_str: String = row.get("created_at")?;
    let created_at = parse_stamp(&created_str).map_err(|e| conversion_error(7, e))?;

    let confirmed_at = match row.get::<_, Option<String>>("confirmed_at")? {
        Some(s) => Some(parse_stamp(&s).map_err(|e| conversion_error(9, e))?),
        None => None,
    };

    Ok(Reservation {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        event_id: row.get("event_id")?,
        subject: row.get("subject")?,
        campus: row.get("campus")?,
        exam_date,
        exam_time: row.get("exam_time")?,
        created_at,
        confirmed: row.get::<_, i32>("confirmed")? == 1,
        confirmed_at,
        attended: row.get::<_, i32>("attended")? == 1,
        submitted_work: row.get::<_, i32>("submitted_work")? == 1,
    })
}

pub fn insert_reservation(
    conn: &Connection,
    event_id: i64,
    req: &ReservationRequest,
    created_at: &DateTime<Utc>,
) -> Result<Reservation> {
    conn.execute(
        "INSERT INTO reservations (student_id, event_id, subject, campus, exam_date, exam_time, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            req.student_id,
            event_id,
            req.subject,
            req.campus,
            date_to_sql(&req.date),
            req.time,
            to_stamp(created_at),
        ],
    )?;

    Ok(Reservation {
        id: conn.last_insert_rowid(),
        student_id: req.student_id,
        event_id,
        subject: req.subject.clone(),
        campus: req.campus.clone(),
        exam_date: req.date,
        exam_time: req.time.clone(),
        created_at: *created_at,
        confirmed: false,
        confirmed_at: None,
        attended: false,
        submitted_work: false,
    })
}

pub fn load_reservation(conn: &Connection, id: i64) -> AppResult<Option<Reservation>> {
    let sql = format!("SELECT {} FROM reservations WHERE id = ?1", RESERVATION_COLUMNS);
    let found = conn
        .query_row(&sql, [id], map_reservation)
        .optional()?;
    Ok(found)
}

pub fn delete_reservation(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM reservations WHERE id = ?1", [id])?)
}

/// Live reservations in one cell.
pub fn count_cell(conn: &Connection, cell: &Cell) -> AppResult<u32> {
    let n: u32 = conn.query_row(
        "SELECT COUNT(*) FROM reservations
         WHERE event_id = ?1 AND campus = ?2 AND exam_date = ?3 AND exam_time = ?4",
        params![cell.event_id, cell.campus, date_to_sql(&cell.date), cell.time],
        |row| row.get(0),
    )?;
    Ok(n)
}

pub fn count_student_reservations(
    conn: &Connection,
    student_id: i64,
    event_id: i64,
) -> AppResult<u32> {
    let n: u32 = conn.query_row(
        "SELECT COUNT(*) FROM reservations WHERE student_id = ?1 AND event_id = ?2",
        params![student_id, event_id],
        |row| row.get(0),
    )?;
    Ok(n)
}

/// Reservations of a student across all events.
pub fn count_student_all_reservations(conn: &Connection, student_id: i64) -> AppResult<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reservations WHERE student_id = ?1",
        [student_id],
        |row| row.get(0),
    )?;
    Ok(n as usize)
}

pub fn has_identical_reservation(
    conn: &Connection,
    event_id: i64,
    req: &ReservationRequest,
) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM reservations
         WHERE student_id = ?1 AND event_id = ?2 AND subject = ?3
           AND campus = ?4 AND exam_date = ?5 AND exam_time = ?6
         LIMIT 1",
    )?;
    let exists = stmt.exists(params![
        req.student_id,
        event_id,
        req.subject,
        req.campus,
        date_to_sql(&req.date),
        req.time,
    ])?;
    Ok(exists)
}

pub fn load_student_reservations(
    conn: &Connection,
    student_id: i64,
    event_id: i64,
) -> AppResult<Vec<Reservation>> {
    let sql = format!(
        "SELECT {} FROM reservations
         WHERE student_id = ?1 AND event_id = ?2
         ORDER BY exam_date ASC, {}, id ASC",
        RESERVATION_COLUMNS, EXAM_TIME_ORDER
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![student_id, event_id], map_reservation)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_event_reservations(conn: &Connection, event_id: i64) -> AppResult<Vec<Reservation>> {
    let sql = format!(
        "SELECT {} FROM reservations
         WHERE event_id = ?1
         ORDER BY campus ASC, exam_date ASC, {}, id ASC",
        RESERVATION_COLUMNS, EXAM_TIME_ORDER
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([event_id], map_reservation)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_event_reservations(conn: &Connection, event_id: i64) -> AppResult<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reservations WHERE event_id = ?1",
        [event_id],
        |row| row.get(0),
    )?;
    Ok(n as usize)
}

/// Stamp the confirmation only if the row is not confirmed yet.
/// Returns the number of rows changed (0 when already confirmed).
pub fn mark_confirmed(conn: &Connection, id: i64, at: &DateTime<Utc>) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE reservations SET confirmed = 1, confirmed_at = ?1
         WHERE id = ?2 AND confirmed = 0",
        params![to_stamp(at), id],
    )?)
}

pub fn update_outcome(conn: &Connection, id: i64, outcome: &Outcome) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE reservations
         SET attended = COALESCE(?1, attended),
             submitted_work = COALESCE(?2, submitted_work)
         WHERE id = ?3",
        params![
            outcome.attended.map(i32::from),
            outcome.submitted_work.map(i32::from),
            id
        ],
    )?)
}

// ---------------------------------------------------------------------------
// Trial events
// ---------------------------------------------------------------------------

pub fn map_event(row: &Row) -> Result<TrialEvent> {
    let times_json: String = row.get("default_times")?;
    let default_times = serde_json::from_str(&times_json)
        .map_err(|e| conversion_error(4, AppError::from(e)))?;

    let campuses_json: String = row.get("campuses")?;
    let campuses = serde_json::from_str(&campuses_json)
        .map_err(|e| conversion_error(6, AppError::from(e)))?;

    Ok(TrialEvent {
        id: row.get("id")?,
        name: row.get("name")?,
        is_active: row.get::<_, i32>("is_active")? == 1,
        max_reservations: row.get("max_reservations")?,
        default_times,
        default_capacity: row.get("default_capacity")?,
        campuses,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_event(conn: &Connection, ev: &TrialEvent) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO trial_events
            (name, is_active, max_reservations, default_times, default_capacity, campuses, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            ev.name,
            i32::from(ev.is_active),
            ev.max_reservations,
            serde_json::to_string(&ev.default_times)?,
            ev.default_capacity,
            serde_json::to_string(&ev.campuses)?,
            ev.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update an event (all fields except id and created_at)
pub fn update_event(conn: &Connection, ev: &TrialEvent) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE trial_events
         SET name = ?1, is_active = ?2, max_reservations = ?3,
             default_times = ?4, default_capacity = ?5, campuses = ?6
         WHERE id = ?7",
        params![
            ev.name,
            i32::from(ev.is_active),
            ev.max_reservations,
            serde_json::to_string(&ev.default_times)?,
            ev.default_capacity,
            serde_json::to_string(&ev.campuses)?,
            ev.id,
        ],
    )?)
}

pub fn load_event(conn: &Connection, id: i64) -> AppResult<Option<TrialEvent>> {
    let sql = format!("SELECT {} FROM trial_events WHERE id = ?1", EVENT_COLUMNS);
    Ok(conn.query_row(&sql, [id], map_event).optional()?)
}

pub fn load_active_event(conn: &Connection) -> AppResult<Option<TrialEvent>> {
    let sql = format!(
        "SELECT {} FROM trial_events WHERE is_active = 1 LIMIT 1",
        EVENT_COLUMNS
    );
    Ok(conn.query_row(&sql, [], map_event).optional()?)
}

pub fn load_events(conn: &Connection) -> AppResult<Vec<TrialEvent>> {
    let sql = format!("SELECT {} FROM trial_events ORDER BY id ASC", EVENT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_event)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Deactivate every event except `keep_id`.
pub fn deactivate_all_except(conn: &Connection, keep_id: i64) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE trial_events SET is_active = 0 WHERE id != ?1 AND is_active = 1",
        [keep_id],
    )?)
}

pub fn delete_event(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM trial_events WHERE id = ?1", [id])?)
}
