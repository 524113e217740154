#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use examslot::config::Config;
use examslot::core::catalog::EventCatalog;
use examslot::db::initialize::init_db;
use examslot::db::pool::DbPool;
use examslot::directory;
use examslot::models::trial_event::{EventDefinition, TrialEvent};
use std::env;
use std::fs;
use std::path::PathBuf;

/// "Winter Trial": campus North holds the exam on 2026-01-05 at 9:00 and
/// 12:00. 9:00 has two seats, everything else falls back to 45. One
/// reservation per student.
pub const WINTER_TRIAL: &str = r#"
name: Winter Trial
is_active: true
max_reservations: 1
default_times: ["9:00", "12:00"]
campuses:
  North:
    days:
      - label: Day 1
        date: "2026-01-05"
    capacity:
      "9:00": 2
"#;

pub fn esl() -> Command {
    cargo_bin_cmd!("examslot")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_examslot.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Write `content` to a temp file and return its path (for event definitions).
pub fn temp_file(name: &str, ext: &str, content: &str) -> String {
    let p = temp_out(name, ext);
    fs::write(&p, content).expect("write temp file");
    p
}

/// Fresh, migrated database plus a config pointing at it.
pub fn open_test_pool(name: &str) -> (DbPool, Config) {
    let db_path = setup_test_db(name);
    let pool = DbPool::new(&db_path).expect("open db");
    init_db(&pool.conn).expect("init db");
    (pool, Config::with_database(&db_path))
}

pub fn create_event(pool: &mut DbPool, cfg: &Config, yaml: &str) -> TrialEvent {
    let def: EventDefinition = serde_yaml::from_str(yaml).expect("parse event definition");
    EventCatalog::create_event(pool, def, cfg).expect("create event")
}

pub fn add_student(pool: &DbPool, name: &str) -> i64 {
    directory::add_student(&pool.conn, name, Some(11)).expect("add student")
}

/// Initialize a DB through the CLI, create the Winter Trial event and three
/// students (ids 1, 2, 3).
pub fn init_cli_with_winter_trial(name: &str) -> String {
    let db_path = setup_test_db(name);

    esl()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    let def = temp_file(name, "yaml", WINTER_TRIAL);
    esl()
        .args(["--db", &db_path, "event", "create", &def])
        .assert()
        .success();

    for student in ["Anna Petrova", "Boris Ivanov", "Clara Smirnova"] {
        esl()
            .args(["--db", &db_path, "student", "add", student, "--class", "11"])
            .assert()
            .success();
    }

    db_path
}
