mod common;
use common::{WINTER_TRIAL, add_student, create_event, open_test_pool, setup_test_db};

use chrono::NaiveDate;
use examslot::config::{Config, OrphanPolicy};
use examslot::core::allocator::{AdmissionPolicy, SlotAllocator};
use examslot::core::catalog::EventCatalog;
use examslot::db::pool::DbPool;
use examslot::db::queries;
use examslot::errors::AppError;
use examslot::export::ExportLogic;
use examslot::models::reservation::ReservationRequest;
use examslot::models::slot::Cell;
use examslot::models::trial_event::EventPatch;
use std::sync::{Arc, Barrier};
use std::thread;

fn jan5() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

fn req(student: i64, subject: &str, time: &str) -> ReservationRequest {
    ReservationRequest::new(student, subject, "North", jan5(), time)
}

fn policy() -> AdmissionPolicy {
    AdmissionPolicy::default()
}

#[test]
fn test_winter_trial_scenario() {
    let (mut pool, cfg) = open_test_pool("alloc_winter_trial");
    create_event(&mut pool, &cfg, WINTER_TRIAL);
    let a = add_student(&pool, "Student A");
    let b = add_student(&pool, "Student B");
    let c = add_student(&pool, "Student C");

    let first = SlotAllocator::request_reservation(&mut pool, req(a, "Math", "9:00"), &policy())
        .expect("A books");
    SlotAllocator::request_reservation(&mut pool, req(b, "Physics", "9:00"), &policy())
        .expect("B books");

    let full = SlotAllocator::request_reservation(&mut pool, req(c, "Math", "9:00"), &policy());
    assert!(matches!(full, Err(AppError::SlotFull(_))));
    assert!(full.as_ref().err().is_some_and(AppError::is_rejection));

    let quota = SlotAllocator::request_reservation(&mut pool, req(a, "History", "12:00"), &policy());
    assert!(matches!(quota, Err(AppError::QuotaExceeded(1))));

    SlotAllocator::cancel_reservation(&mut pool, first.id).expect("A cancels");

    SlotAllocator::request_reservation(&mut pool, req(c, "Math", "9:00"), &policy())
        .expect("C books the freed seat");
}

#[test]
fn test_no_active_event() {
    let (mut pool, cfg) = open_test_pool("alloc_no_active");
    let ev = create_event(&mut pool, &cfg, WINTER_TRIAL);
    EventCatalog::set_active(&mut pool, ev.id, false).unwrap();
    let a = add_student(&pool, "Student A");

    let res = SlotAllocator::request_reservation(&mut pool, req(a, "Math", "9:00"), &policy());
    assert!(matches!(res, Err(AppError::NoActiveEvent)));
}

#[test]
fn test_invalid_slot_variants() {
    let (mut pool, cfg) = open_test_pool("alloc_invalid_slot");
    create_event(&mut pool, &cfg, WINTER_TRIAL);
    let a = add_student(&pool, "Student A");

    // time not offered that day
    let res = SlotAllocator::request_reservation(&mut pool, req(a, "Math", "15:00"), &policy());
    assert!(matches!(res, Err(AppError::InvalidSlot(_))));

    // unknown campus
    let res = SlotAllocator::request_reservation(
        &mut pool,
        ReservationRequest::new(a, "Math", "South", jan5(), "9:00"),
        &policy(),
    );
    assert!(matches!(res, Err(AppError::InvalidSlot(_))));

    // date the campus does not hold
    let res = SlotAllocator::request_reservation(
        &mut pool,
        ReservationRequest::new(a, "Math", "North", jan5().succ_opt().unwrap(), "9:00"),
        &policy(),
    );
    assert!(matches!(res, Err(AppError::InvalidSlot(_))));

    // garbage time label
    let res = SlotAllocator::request_reservation(&mut pool, req(a, "Math", "nine"), &policy());
    assert!(matches!(res, Err(AppError::InvalidSlot(_))));
}

#[test]
fn test_time_label_is_normalized() {
    let (mut pool, cfg) = open_test_pool("alloc_time_label");
    create_event(&mut pool, &cfg, WINTER_TRIAL);
    let a = add_student(&pool, "Student A");

    let r = SlotAllocator::request_reservation(&mut pool, req(a, "Math", "09:00"), &policy())
        .expect("09:00 is the same slot as 9:00");
    assert_eq!(r.exam_time, "9:00");
}

#[test]
fn test_unknown_student_is_not_found() {
    let (mut pool, cfg) = open_test_pool("alloc_unknown_student");
    create_event(&mut pool, &cfg, WINTER_TRIAL);

    let res = SlotAllocator::request_reservation(&mut pool, req(999, "Math", "9:00"), &policy());
    assert!(matches!(res, Err(AppError::NotFound(_))));
}

#[test]
fn test_duplicate_reservation() {
    let (mut pool, cfg) = open_test_pool("alloc_duplicate");
    let yaml = WINTER_TRIAL.replace("max_reservations: 1", "max_reservations: 4");
    create_event(&mut pool, &cfg, &yaml);
    let a = add_student(&pool, "Student A");

    SlotAllocator::request_reservation(&mut pool, req(a, "Math", "12:00"), &policy()).unwrap();
    let dup = SlotAllocator::request_reservation(&mut pool, req(a, "Math", "12:00"), &policy());
    assert!(matches!(dup, Err(AppError::DuplicateReservation)));

    // a different subject in the same cell is not a duplicate
    SlotAllocator::request_reservation(&mut pool, req(a, "Physics", "12:00"), &policy()).unwrap();

    let rows = SlotAllocator::student_reservations(&mut pool, a, None).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_quota_freed_by_cancellation() {
    let (mut pool, cfg) = open_test_pool("alloc_quota_cancel");
    let yaml = WINTER_TRIAL.replace("max_reservations: 1", "max_reservations: 2");
    create_event(&mut pool, &cfg, &yaml);
    let a = add_student(&pool, "Student A");

    let first =
        SlotAllocator::request_reservation(&mut pool, req(a, "Math", "12:00"), &policy()).unwrap();
    SlotAllocator::request_reservation(&mut pool, req(a, "Physics", "12:00"), &policy()).unwrap();

    let over = SlotAllocator::request_reservation(&mut pool, req(a, "History", "12:00"), &policy());
    assert!(matches!(over, Err(AppError::QuotaExceeded(2))));

    SlotAllocator::cancel_reservation(&mut pool, first.id).unwrap();
    SlotAllocator::request_reservation(&mut pool, req(a, "History", "12:00"), &policy())
        .expect("cancellation frees one unit of quota");
}

#[test]
fn test_cancel_unknown_reservation() {
    let (mut pool, _cfg) = open_test_pool("alloc_cancel_unknown");
    let res = SlotAllocator::cancel_reservation(&mut pool, 42);
    assert!(matches!(res, Err(AppError::NotFound(_))));
}

#[test]
fn test_availability_matches_admission() {
    let (mut pool, cfg) = open_test_pool("alloc_availability");
    let ev = create_event(&mut pool, &cfg, WINTER_TRIAL);
    let a = add_student(&pool, "Student A");

    SlotAllocator::request_reservation(&mut pool, req(a, "Math", "9:00"), &policy()).unwrap();

    let seats = SlotAllocator::available_seats(&mut pool, ev.id, "North", jan5()).unwrap();
    assert_eq!(seats.len(), 2);

    assert_eq!(seats[0].time, "9:00");
    assert_eq!(seats[0].booked, 1);
    assert_eq!(seats[0].capacity, 2);
    assert_eq!(seats[0].available, 1);

    assert_eq!(seats[1].time, "12:00");
    assert_eq!(seats[1].booked, 0);
    assert_eq!(seats[1].capacity, 45);
    assert_eq!(seats[1].available, 45);

    // same campus spelling tolerance as reserve
    let padded = SlotAllocator::available_seats(&mut pool, ev.id, " North ", jan5()).unwrap();
    assert_eq!(padded, seats);

    let res = SlotAllocator::available_seats(&mut pool, ev.id, "South", jan5());
    assert!(matches!(res, Err(AppError::InvalidSlot(_))));

    let res = SlotAllocator::available_seats(&mut pool, 999, "North", jan5());
    assert!(matches!(res, Err(AppError::NotFound(_))));
}

#[test]
fn test_student_reservations_without_active_event() {
    let (mut pool, cfg) = open_test_pool("alloc_list_inactive");
    let ev = create_event(&mut pool, &cfg, WINTER_TRIAL);
    let a = add_student(&pool, "Student A");
    SlotAllocator::request_reservation(&mut pool, req(a, "Math", "9:00"), &policy()).unwrap();

    EventCatalog::set_active(&mut pool, ev.id, false).unwrap();

    let rows = SlotAllocator::student_reservations(&mut pool, a, None).unwrap();
    assert!(rows.is_empty());

    let rows = SlotAllocator::student_reservations(&mut pool, a, Some(ev.id)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].subject, "Math");
}

#[test]
fn test_concurrent_admission_never_oversells() {
    const THREADS: usize = 16;

    let db_path = setup_test_db("alloc_concurrent");
    let cfg = Config::with_database(&db_path);

    let yaml = WINTER_TRIAL.replace("\"9:00\": 2", "\"9:00\": 5");
    let (event_id, students) = {
        let mut pool = DbPool::new(&db_path).unwrap();
        examslot::db::initialize::init_db(&pool.conn).unwrap();
        let ev = create_event(&mut pool, &cfg, &yaml);
        let ids: Vec<i64> = (0..THREADS)
            .map(|i| add_student(&pool, &format!("Student {}", i)))
            .collect();
        (ev.id, ids)
    };

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = students
        .into_iter()
        .map(|student| {
            let barrier = Arc::clone(&barrier);
            let path = db_path.clone();
            thread::spawn(move || {
                let mut pool = DbPool::new(&path).unwrap();
                barrier.wait();
                SlotAllocator::request_reservation(&mut pool, req(student, "Math", "9:00"), &policy())
            })
        })
        .collect();

    let mut admitted = 0;
    for h in handles {
        match h.join().unwrap() {
            Ok(_) => admitted += 1,
            Err(AppError::SlotFull(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    let pool = DbPool::new(&db_path).unwrap();
    let booked = queries::count_cell(
        &pool.conn,
        &Cell {
            event_id,
            campus: "North".into(),
            date: jan5(),
            time: "9:00".into(),
        },
    )
    .unwrap();

    assert_eq!(admitted, 5);
    assert_eq!(booked, 5);
}

#[test]
fn test_concurrent_requests_from_one_student_respect_quota() {
    const THREADS: usize = 8;

    let db_path = setup_test_db("alloc_concurrent_quota");
    let cfg = Config::with_database(&db_path);

    let yaml = WINTER_TRIAL.replace("max_reservations: 1", "max_reservations: 3");
    let (event_id, student) = {
        let mut pool = DbPool::new(&db_path).unwrap();
        examslot::db::initialize::init_db(&pool.conn).unwrap();
        let ev = create_event(&mut pool, &cfg, &yaml);
        (ev.id, add_student(&pool, "Greedy Student"))
    };

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let path = db_path.clone();
            thread::spawn(move || {
                let mut pool = DbPool::new(&path).unwrap();
                barrier.wait();
                let subject = format!("Subject {}", i);
                SlotAllocator::request_reservation(&mut pool, req(student, &subject, "12:00"), &policy())
            })
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|r| r.is_ok())
        .count();

    let pool = DbPool::new(&db_path).unwrap();
    let held = queries::count_student_reservations(&pool.conn, student, event_id).unwrap();

    assert_eq!(admitted, 3);
    assert_eq!(held, 3);
}

#[test]
fn test_reservations_come_back_in_time_order() {
    let (mut pool, cfg) = open_test_pool("alloc_time_order");
    let ev = create_event(&mut pool, &cfg, WINTER_TRIAL);
    let two_each = EventPatch {
        max_reservations: Some(2),
        ..EventPatch::default()
    };
    EventCatalog::update_event(&mut pool, ev.id, two_each, OrphanPolicy::Reject).unwrap();

    let a = add_student(&pool, "Student A");
    let b = add_student(&pool, "Student B");
    SlotAllocator::request_reservation(&mut pool, req(a, "Math", "9:00"), &policy()).unwrap();
    SlotAllocator::request_reservation(&mut pool, req(a, "History", "12:00"), &policy()).unwrap();
    SlotAllocator::request_reservation(&mut pool, req(b, "Physics", "12:00"), &policy()).unwrap();
    SlotAllocator::request_reservation(&mut pool, req(b, "Biology", "9:00"), &policy()).unwrap();

    let times = |rows: &[examslot::models::reservation::Reservation]| -> Vec<String> {
        rows.iter().map(|r| r.exam_time.clone()).collect()
    };

    let listed = SlotAllocator::student_reservations(&mut pool, a, None).unwrap();
    assert_eq!(times(&listed), vec!["9:00", "12:00"]);

    let listed = SlotAllocator::student_reservations(&mut pool, b, None).unwrap();
    assert_eq!(times(&listed), vec!["9:00", "12:00"]);

    let scanned = queries::load_event_reservations(&pool.conn, ev.id).unwrap();
    assert_eq!(times(&scanned), vec!["9:00", "9:00", "12:00", "12:00"]);

    let exported: Vec<String> = ExportLogic::rows(&mut pool, Some(ev.id))
        .unwrap()
        .into_iter()
        .map(|r| r.exam_time)
        .collect();
    assert_eq!(exported, vec!["9:00", "9:00", "12:00", "12:00"]);
}
