//! Slot allocator: admission of reservation requests and the seat
//! availability projection.
//!
//! Admission reads the active event, the student's reservations and the cell
//! occupancy, then inserts, all inside one `BEGIN IMMEDIATE` transaction. The
//! write lock is taken before the first read, so two concurrent requests can
//! never both see the last free seat.

use crate::config::Config;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::directory::{SqliteDirectory, StudentDirectory};
use crate::errors::{AppError, AppResult};
use crate::models::reservation::{Reservation, ReservationRequest};
use crate::models::slot::{Cell, SlotAvailability};
use crate::models::trial_event::TrialEvent;
use crate::utils::time::normalize_time_label;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, ErrorCode, ffi};
use std::thread;
use std::time::Duration;

/// How long admission keeps trying when the database write lock stays
/// contended past the connection's busy timeout.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            retries: 5,
            backoff: Duration::from_millis(50),
        }
    }
}

impl AdmissionPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            retries: cfg.admission_retries,
            ..Self::default()
        }
    }
}

fn is_contention(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Occupancy of one cell. The single counting rule shared by admission and
/// the availability projection.
pub fn occupancy(
    conn: &Connection,
    event: &TrialEvent,
    cell: &Cell,
) -> AppResult<SlotAvailability> {
    let booked = queries::count_cell(conn, cell)?;
    let capacity = event.capacity_for(&cell.campus, &cell.time);
    Ok(SlotAvailability::new(cell.time.clone(), booked, capacity))
}

pub struct SlotAllocator;

impl SlotAllocator {
    /// Admit a reservation request against the active event, or explain
    /// why not. Lock contention is retried internally; a request that still
    /// cannot get the lock is reported as [`AppError::SlotFull`].
    pub fn request_reservation(
        pool: &mut DbPool,
        req: ReservationRequest,
        policy: &AdmissionPolicy,
    ) -> AppResult<Reservation> {
        let req = ReservationRequest {
            subject: req.subject.trim().to_string(),
            campus: req.campus.trim().to_string(),
            time: normalize_time_label(&req.time)
                .map_err(|_| AppError::InvalidSlot(format!("time '{}'", req.time)))?,
            ..req
        };

        let mut attempt = 0;
        loop {
            match Self::admit(pool, &req) {
                Err(AppError::Db(e)) if is_contention(&e) => {
                    attempt += 1;
                    if attempt > policy.retries {
                        return Err(AppError::SlotFull(format!(
                            "{} {} {}",
                            req.campus,
                            req.date.format("%Y-%m-%d"),
                            req.time
                        )));
                    }
                    thread::sleep(policy.backoff * attempt);
                }
                other => return other,
            }
        }
    }

    fn admit(pool: &mut DbPool, req: &ReservationRequest) -> AppResult<Reservation> {
        let tx = pool.write_tx()?;

        let event = queries::load_active_event(&tx)?.ok_or(AppError::NoActiveEvent)?;

        if !SqliteDirectory::new(&tx).exists(req.student_id)? {
            return Err(AppError::NotFound(format!("student {}", req.student_id)));
        }

        if !event.offers(&req.campus, req.date, &req.time) {
            return Err(AppError::InvalidSlot(format!(
                "{} {} {}",
                req.campus,
                req.date.format("%Y-%m-%d"),
                req.time
            )));
        }

        let held = queries::count_student_reservations(&tx, req.student_id, event.id)?;
        if held >= event.max_reservations {
            return Err(AppError::QuotaExceeded(event.max_reservations));
        }

        if queries::has_identical_reservation(&tx, event.id, req)? {
            return Err(AppError::DuplicateReservation);
        }

        let cell = Cell::new(event.id, &req.campus, req.date, req.time.as_str());
        if occupancy(&tx, &event, &cell)?.available == 0 {
            return Err(AppError::SlotFull(cell.to_string()));
        }

        let reservation = match queries::insert_reservation(&tx, event.id, req, &Utc::now()) {
            Ok(r) => r,
            Err(e) if is_unique_violation(&e) => return Err(AppError::DuplicateReservation),
            Err(e) => return Err(e.into()),
        };

        audit(
            &tx,
            "reserve",
            &format!("reservation {}", reservation.id),
            &format!(
                "Student {} booked {} at {}",
                req.student_id, req.subject, cell
            ),
        )?;
        tx.commit()?;

        Ok(reservation)
    }

    /// Per-time occupancy of one campus day, in the configured time order.
    pub fn available_seats(
        pool: &mut DbPool,
        event_id: i64,
        campus: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<SlotAvailability>> {
        let event = queries::load_event(&pool.conn, event_id)?
            .ok_or_else(|| AppError::NotFound(format!("event {}", event_id)))?;

        let times = event.times_for(campus, date).ok_or_else(|| {
            AppError::InvalidSlot(format!("{} {}", campus, date.format("%Y-%m-%d")))
        })?;

        let mut out = Vec::with_capacity(times.len());
        for time in times {
            let cell = Cell::new(event_id, campus, date, time.as_str());
            out.push(occupancy(&pool.conn, &event, &cell)?);
        }
        Ok(out)
    }

    /// Hard-delete a reservation, freeing its seat and one unit of the
    /// student's quota. Returns the deleted row.
    pub fn cancel_reservation(pool: &mut DbPool, id: i64) -> AppResult<Reservation> {
        let tx = pool.write_tx()?;

        let reservation = queries::load_reservation(&tx, id)?
            .ok_or_else(|| AppError::NotFound(format!("reservation {}", id)))?;

        queries::delete_reservation(&tx, id)?;
        audit(
            &tx,
            "cancel",
            &format!("reservation {}", id),
            &format!(
                "Student {} released {} at {}",
                reservation.student_id,
                reservation.subject,
                reservation.cell()
            ),
        )?;
        tx.commit()?;

        Ok(reservation)
    }

    /// A student's reservations for `event_id`, or for the active event when
    /// none is given (empty when no event is active).
    pub fn student_reservations(
        pool: &mut DbPool,
        student_id: i64,
        event_id: Option<i64>,
    ) -> AppResult<Vec<Reservation>> {
        let event_id = match event_id {
            Some(id) => id,
            None => match queries::load_active_event(&pool.conn)? {
                Some(ev) => ev.id,
                None => return Ok(Vec::new()),
            },
        };
        queries::load_student_reservations(&pool.conn, student_id, event_id)
    }
}
