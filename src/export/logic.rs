use super::ExportFormat;
use super::csv::write_csv;
use super::fs_utils::ensure_writable;
use super::json::write_json;
use super::model::ReservationExport;
use super::notify_export_success;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use rusqlite::params;
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Rows of one event (the active one when `event_id` is `None`), ordered
    /// the way campus staff read them: campus, date, time, student name.
    pub fn rows(pool: &mut DbPool, event_id: Option<i64>) -> AppResult<Vec<ReservationExport>> {
        let event_id = match event_id {
            Some(id) => id,
            None => queries::load_active_event(&pool.conn)?
                .map(|e| e.id)
                .ok_or(AppError::NoActiveEvent)?,
        };

        let sql = format!(
            "SELECT r.id, e.name, r.student_id, s.full_name, s.class_num, r.subject, r.campus,
                    r.exam_date, r.exam_time, r.confirmed, r.confirmed_at, r.attended,
                    r.submitted_work
             FROM reservations r
             JOIN trial_events e ON e.id = r.event_id
             JOIN students s ON s.id = r.student_id
             WHERE r.event_id = ?1
             ORDER BY r.campus ASC, r.exam_date ASC, {}, s.full_name ASC",
            queries::EXAM_TIME_ORDER
        );
        let mut stmt = pool.conn.prepare(&sql)?;

        let rows = stmt.query_map(params![event_id], |row| {
            let confirmed = row.get::<_, i32>(9)? == 1;
            Ok(ReservationExport {
                id: row.get(0)?,
                event: row.get(1)?,
                student_id: row.get(2)?,
                student_name: row.get(3)?,
                class_num: row.get(4)?,
                subject: row.get(5)?,
                campus: row.get(6)?,
                exam_date: row.get(7)?,
                exam_time: row.get(8)?,
                state: if confirmed { "confirmed" } else { "registered" }.to_string(),
                confirmed_at: row.get(10)?,
                attended: row.get::<_, i32>(11)? == 1,
                submitted_work: row.get::<_, i32>(12)? == 1,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn export(
        pool: &mut DbPool,
        event_id: Option<i64>,
        format: ExportFormat,
        path: &Path,
        force: bool,
    ) -> AppResult<usize> {
        let rows = Self::rows(pool, event_id)?;
        if rows.is_empty() {
            warning("No reservations to export; writing an empty file.");
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => write_csv(path, &rows)?,
            ExportFormat::Json => write_json(path, &rows)?,
        }

        notify_export_success(&format.as_str().to_uppercase(), path);
        Ok(rows.len())
    }
}
