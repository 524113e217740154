mod common;
use common::setup_test_db;

use chrono::DateTime;
use examslot::core::log::LogLogic;
use examslot::db::initialize::init_db;
use examslot::db::pool::DbPool;

/// Reservations table as it looked before attendance tracking.
const OLD_RESERVATIONS: &str = r#"
CREATE TABLE reservations (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id   INTEGER NOT NULL,
    event_id     INTEGER NOT NULL,
    subject      TEXT NOT NULL,
    campus       TEXT NOT NULL,
    exam_date    TEXT NOT NULL,
    exam_time    TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    confirmed    INTEGER NOT NULL DEFAULT 0,
    confirmed_at TEXT
);
"#;

#[test]
fn test_outcome_columns_added_and_logged() {
    let db_path = setup_test_db("migrate_outcome_columns");
    let mut pool = DbPool::new(&db_path).expect("open db");
    pool.conn.execute_batch(OLD_RESERVATIONS).expect("old schema");

    init_db(&pool.conn).expect("migrate");
    // second run finds nothing to do
    init_db(&pool.conn).expect("migrate again");

    let mut stmt = pool
        .conn
        .prepare("SELECT date, message FROM log WHERE operation = 'migrate_column' ORDER BY id")
        .unwrap();
    let rows: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    drop(stmt);

    assert_eq!(rows.len(), 2);
    assert!(rows[0].1.contains("attended"));
    assert!(rows[1].1.contains("submitted_work"));
    for (date, _) in &rows {
        assert!(
            DateTime::parse_from_rfc3339(date).is_ok(),
            "log date '{}' is not RFC 3339",
            date
        );
    }

    // printed log shows the same normalized date form for every entry
    let entries = LogLogic::entries(&mut pool).unwrap();
    assert!(entries.iter().all(|e| DateTime::parse_from_rfc3339(&e.date).is_ok()));
}
