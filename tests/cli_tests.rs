use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{esl, init_cli_with_winter_trial, setup_test_db, temp_file, temp_out};

fn reserve(db: &str, student: &str, subject: &str, time: &str) -> assert_cmd::assert::Assert {
    esl()
        .args([
            "--db",
            db,
            "reserve",
            student,
            subject,
            "North",
            "2026-01-05",
            time,
            "--skip-subject-check",
        ])
        .assert()
}

#[test]
fn test_init_creates_schema() {
    let db_path = setup_test_db("cli_init");

    esl()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    esl()
        .args(["--db", &db_path, "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"));

    esl()
        .args(["--db", &db_path, "event", "list"])
        .assert()
        .success()
        .stdout(contains("No events defined"));
}

#[test]
fn test_winter_trial_scenario_via_cli() {
    let db = init_cli_with_winter_trial("cli_winter_trial");

    reserve(&db, "1", "Math", "9:00")
        .success()
        .stdout(contains("Reservation #1 Math at North 2026-01-05 9:00 created"));

    reserve(&db, "2", "Physics", "9:00").success();

    reserve(&db, "3", "Math", "9:00")
        .failure()
        .stderr(contains("No free seats left"));

    reserve(&db, "1", "History", "12:00")
        .failure()
        .stderr(contains("Reservation limit reached: at most 1"));

    esl()
        .args(["--db", &db, "cancel", "1"])
        .assert()
        .success()
        .stdout(contains("cancelled"));

    reserve(&db, "3", "Math", "9:00").success();

    esl()
        .args(["--db", &db, "availability", "North", "2026-01-05"])
        .assert()
        .success()
        .stdout(contains("9:00").and(contains("12:00")).and(contains("45")));
}

#[test]
fn test_json_errors_carry_a_code() {
    let db = init_cli_with_winter_trial("cli_json_errors");

    esl()
        .args([
            "--db",
            &db,
            "--json",
            "reserve",
            "1",
            "Math",
            "North",
            "2026-01-05",
            "7:00",
            "--skip-subject-check",
        ])
        .assert()
        .failure()
        .stdout(contains("\"error\":\"invalid_slot\""));

    esl()
        .args(["--db", &db, "event", "deactivate", "1"])
        .assert()
        .success();

    esl()
        .args([
            "--db",
            &db,
            "--json",
            "reserve",
            "1",
            "Math",
            "North",
            "2026-01-05",
            "9:00",
            "--skip-subject-check",
        ])
        .assert()
        .failure()
        .stdout(contains("\"error\":\"no_active_event\""));

    esl()
        .args(["--db", &db, "--json", "confirm", "99"])
        .assert()
        .failure()
        .stdout(contains("\"error\":\"not_found\""));
}

#[test]
fn test_subject_checked_against_grade_list() {
    let db = init_cli_with_winter_trial("cli_subject_check");

    esl()
        .args([
            "--db",
            &db,
            "reserve",
            "1",
            "Astrology",
            "North",
            "2026-01-05",
            "9:00",
        ])
        .assert()
        .failure()
        .stderr(contains("Subject not available"));

    esl()
        .args([
            "--db",
            &db,
            "reserve",
            "1",
            "Математика (профиль)",
            "North",
            "2026-01-05",
            "9:00",
        ])
        .assert()
        .success();

    esl()
        .args(["--db", &db, "student", "subjects", "1"])
        .assert()
        .success()
        .stdout(contains("Математика (профиль)"));
}

#[test]
fn test_duplicate_via_cli() {
    let db = init_cli_with_winter_trial("cli_duplicate");
    let patch = temp_file("cli_duplicate_patch", "yaml", "max_reservations: 3\n");

    esl()
        .args(["--db", &db, "event", "update", "1", &patch])
        .assert()
        .success();

    reserve(&db, "1", "Math", "12:00").success();
    reserve(&db, "1", "Math", "12:00")
        .failure()
        .stderr(contains("already registered"));
}

#[test]
fn test_confirm_outcome_and_list() {
    let db = init_cli_with_winter_trial("cli_lifecycle");
    reserve(&db, "1", "Math", "9:00").success();

    esl()
        .args(["--db", &db, "confirm", "1"])
        .assert()
        .success()
        .stdout(contains("confirmed"));

    // second confirmation is a no-op, not an error
    esl()
        .args(["--db", &db, "confirm", "1"])
        .assert()
        .success();

    esl()
        .args(["--db", &db, "outcome", "1", "--attended", "true"])
        .assert()
        .success()
        .stdout(contains("attended=true").and(contains("submitted_work=false")));

    esl()
        .args(["--db", &db, "--json", "list", "1"])
        .assert()
        .success()
        .stdout(
            contains("\"confirmed\": true")
                .and(contains("\"attended\": true"))
                .and(contains("\"exam_time\": \"9:00\"")),
        );

    esl()
        .args(["--db", &db, "list", "2"])
        .assert()
        .success()
        .stdout(contains("No reservations"));
}

#[test]
fn test_event_commands() {
    let db = init_cli_with_winter_trial("cli_event_cmds");

    let spring = temp_file(
        "cli_event_cmds_spring",
        "json",
        r#"{ "name": "Spring Trial", "is_active": true,
             "campuses": { "South": { "days": [ { "label": "Sat", "date": "2026-04-11" } ] } } }"#,
    );
    esl()
        .args(["--db", &db, "event", "create", &spring])
        .assert()
        .success()
        .stdout(contains("Event #2 'Spring Trial' created"));

    esl()
        .args(["--db", &db, "event", "active"])
        .assert()
        .success()
        .stdout(contains("Spring Trial").and(contains("South")));

    esl()
        .args(["--db", &db, "event", "activate", "1"])
        .assert()
        .success();

    esl()
        .args(["--db", &db, "--json", "event", "list"])
        .assert()
        .success()
        .stdout(contains("\"is_active\": true").count(1));

    esl()
        .args(["--db", &db, "event", "show", "1"])
        .assert()
        .success()
        .stdout(contains("Winter Trial").and(contains("9:00=2")));
}

#[test]
fn test_event_delete_refused_with_reservations() {
    let db = init_cli_with_winter_trial("cli_event_delete");
    reserve(&db, "1", "Math", "9:00").success();

    esl()
        .args(["--db", &db, "event", "delete", "1"])
        .assert()
        .failure()
        .stderr(contains("would be orphaned"));

    esl()
        .args(["--db", &db, "event", "delete", "1", "--force"])
        .assert()
        .success()
        .stdout(contains("1 reservation(s) removed"));
}

#[test]
fn test_remind_lists_due_candidates() {
    let db = init_cli_with_winter_trial("cli_remind");
    reserve(&db, "1", "Math", "9:00").success();

    esl()
        .args([
            "--db",
            &db,
            "student",
            "confirm",
            "2",
            "--chat",
            "4242",
            "--at",
            "2025-12-28T09:00:00Z",
        ])
        .assert()
        .success();

    esl()
        .args([
            "--db",
            &db,
            "--json",
            "remind",
            "--now",
            "2026-01-02T10:00:00Z",
        ])
        .assert()
        .success()
        .stdout(
            contains("\"reservation_id\": 1")
                .and(contains("\"kind\": \"reminder_3d\""))
                .and(contains("\"chat_id\": 4242")),
        );

    esl()
        .args(["--db", &db, "remind", "--now", "2026-01-10T10:00:00Z"])
        .assert()
        .success()
        .stdout(contains("reminder_24h").and(contains("reminder_3d").not()));
}

#[test]
fn test_export_csv_and_json() {
    let db = init_cli_with_winter_trial("cli_export");
    reserve(&db, "1", "Math", "9:00").success();
    reserve(&db, "2", "Physics", "9:00").success();

    let csv_out = temp_out("cli_export", "csv");
    esl()
        .args(["--db", &db, "export", "--format", "csv", "--file", &csv_out])
        .assert()
        .success();

    let content = fs::read_to_string(&csv_out).expect("read exported csv");
    assert!(content.starts_with("id,event,student_id,student_name"));
    assert!(content.contains("Anna Petrova"));
    assert!(content.contains("Boris Ivanov"));
    assert_eq!(content.lines().count(), 3);

    let json_out = temp_out("cli_export", "json");
    esl()
        .args([
            "--db", &db, "export", "--format", "json", "--file", &json_out, "--event", "1",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&json_out).expect("read exported json");
    let rows: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(rows.as_array().map(Vec::len), Some(2));
    assert_eq!(rows[0]["state"], "registered");
}

#[test]
fn test_log_records_mutations() {
    let db = init_cli_with_winter_trial("cli_log");
    reserve(&db, "1", "Math", "9:00").success();
    esl().args(["--db", &db, "cancel", "1"]).assert().success();

    esl()
        .args(["--db", &db, "log", "--print"])
        .assert()
        .success()
        .stdout(
            contains("init")
                .and(contains("event_create"))
                .and(contains("reserve"))
                .and(contains("cancel")),
        );
}

#[test]
fn test_student_delete_frees_seat() {
    let db = init_cli_with_winter_trial("cli_student_delete");
    reserve(&db, "1", "Math", "9:00").success();
    reserve(&db, "2", "Physics", "9:00").success();
    reserve(&db, "3", "Math", "9:00").failure();

    esl()
        .args(["--db", &db, "student", "delete", "1"])
        .assert()
        .success()
        .stdout(contains("1 reservation(s) removed"));

    reserve(&db, "3", "Math", "9:00").success();

    esl()
        .args(["--db", &db, "student", "delete", "1"])
        .assert()
        .failure()
        .stderr(contains("Not found: student 1"));
}
