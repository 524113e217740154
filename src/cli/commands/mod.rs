pub mod availability;
pub mod cancel;
pub mod config;
pub mod confirm;
pub mod db;
pub mod event;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod outcome;
pub mod remind;
pub mod reserve;
pub mod student;

use crate::errors::AppResult;
use crate::models::reservation::Reservation;
use crate::utils::colors::colorize_flag;
use crate::utils::table::Table;
use serde::Serialize;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn reservation_table(rows: &[Reservation]) -> Table {
    let mut table = Table::new([
        "ID", "SUBJECT", "CAMPUS", "DATE", "TIME", "STATE", "ATTENDED", "WORK",
    ]);
    for r in rows {
        table.add_row(vec![
            r.id.to_string(),
            r.subject.clone(),
            r.campus.clone(),
            r.date_str(),
            r.exam_time.clone(),
            r.state().as_str().to_string(),
            colorize_flag(r.attended),
            colorize_flag(r.submitted_work),
        ]);
    }
    table
}

/// One-line summary used after a mutation.
pub(crate) fn describe(r: &Reservation) -> String {
    format!(
        "#{} {} at {} {} {}",
        r.id,
        r.subject,
        r.campus,
        r.date_str(),
        r.exam_time
    )
}
