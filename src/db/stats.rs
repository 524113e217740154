use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    for (label, table) in [
        ("Students", "students"),
        ("Trial events", "trial_events"),
        ("Reservations", "reservations"),
    ] {
        let count: i64 =
            pool.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        println!("{}• {}:{} {}{}{}", CYAN, label, RESET, GREEN, count, RESET);
    }

    let active: Option<(i64, String)> = pool
        .conn
        .query_row(
            "SELECT id, name FROM trial_events WHERE is_active = 1 LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let fmt_active = active
        .map(|(id, name)| format!("#{} {}", id, name))
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));
    println!("{}• Active event:{} {}", CYAN, RESET, fmt_active);

    println!();
    Ok(())
}
