//! Student directory collaborator.
//!
//! The reservation engine does not own student identity. It only needs to
//! know whether a student exists, when (and whether) the student confirmed
//! enrollment through the bot, and the chat to notify. The SQLite
//! implementation reads the `students` table living next to the reservation
//! tables; operator helpers at the bottom maintain it.

use crate::errors::{AppError, AppResult};
use crate::models::student::StudentRecord;
use crate::utils::time::{parse_stamp, to_stamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Subjects of the grade-9 state exam (OGE).
pub const OGE_SUBJECTS: &[&str] = &[
    "Русский язык",
    "Математика",
    "Обществознание",
    "История",
    "Биология",
    "Химия",
    "Физика",
    "Информатика",
    "География",
    "Английский язык",
    "Литература",
];

/// Subjects of the grade-10/11 state exam (EGE).
pub const EGE_SUBJECTS: &[&str] = &[
    "Русский язык",
    "Математика (профиль)",
    "Математика (база)",
    "Обществознание",
    "История",
    "Биология",
    "Химия",
    "Физика",
    "Информатика",
    "География",
    "Английский язык",
    "Литература",
];

/// Effective subject list for a grade level, `None` for grades without a
/// trial exam.
pub fn subjects_for_class(class_num: u8) -> Option<&'static [&'static str]> {
    match class_num {
        9 => Some(OGE_SUBJECTS),
        10 | 11 => Some(EGE_SUBJECTS),
        _ => None,
    }
}

pub trait StudentDirectory {
    fn find_student(&self, id: i64) -> AppResult<Option<StudentRecord>>;

    fn all_students(&self) -> AppResult<Vec<StudentRecord>>;

    fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.find_student(id)?.is_some())
    }

    /// Subject legality check used by callers before they request a seat.
    /// Students without a known grade are not restricted.
    fn check_subject(&self, student: &StudentRecord, subject: &str) -> AppResult<()> {
        let Some(class_num) = student.class_num else {
            return Ok(());
        };
        match subjects_for_class(class_num) {
            Some(list) if list.contains(&subject) => Ok(()),
            Some(_) => Err(AppError::InvalidSubject(subject.to_string())),
            None => Err(AppError::InvalidSubject(format!(
                "no trial exams for grade {}",
                class_num
            ))),
        }
    }
}

pub struct SqliteDirectory<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteDirectory<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

fn map_student(row: &Row) -> rusqlite::Result<StudentRecord> {
    let confirmed_at = match row.get::<_, Option<String>>("confirmed_at")? {
        Some(s) => Some(parse_stamp(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(StudentRecord {
        id: row.get("id")?,
        full_name: row.get("full_name")?,
        chat_id: row.get("chat_id")?,
        class_num: row.get("class_num")?,
        confirmed_at,
    })
}

impl StudentDirectory for SqliteDirectory<'_> {
    fn find_student(&self, id: i64) -> AppResult<Option<StudentRecord>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, full_name, chat_id, class_num, confirmed_at FROM students WHERE id = ?1",
                [id],
                map_student,
            )
            .optional()?;
        Ok(found)
    }

    fn all_students(&self) -> AppResult<Vec<StudentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, full_name, chat_id, class_num, confirmed_at FROM students ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], map_student)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Operator helpers
// ---------------------------------------------------------------------------

pub fn add_student(conn: &Connection, full_name: &str, class_num: Option<u8>) -> AppResult<i64> {
    let name = full_name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(AppError::InvalidStudent("name is empty".into()));
    }
    conn.execute(
        "INSERT INTO students (full_name, class_num) VALUES (?1, ?2)",
        params![name, class_num],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Link a student to a bot chat and stamp the enrollment confirmation.
pub fn confirm_enrollment(
    conn: &Connection,
    student_id: i64,
    chat_id: i64,
    at: &DateTime<Utc>,
) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE students SET chat_id = ?1, confirmed_at = ?2 WHERE id = ?3",
        params![chat_id, to_stamp(at), student_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("student {}", student_id)));
    }
    Ok(())
}

pub fn delete_student(conn: &Connection, student_id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM students WHERE id = ?1", [student_id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("student {}", student_id)));
    }
    Ok(())
}
