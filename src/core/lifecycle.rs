//! Confirmation lifecycle: REGISTERED → CONFIRMED, plus the post-exam
//! outcome flags the operator records.

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::reservation::{Outcome, Reservation};
use chrono::Utc;

pub struct ConfirmationLifecycle;

impl ConfirmationLifecycle {
    /// Mark a reservation as confirmed by the student. Confirming twice is a
    /// no-op: the first `confirmed_at` stamp is kept.
    pub fn confirm(pool: &mut DbPool, id: i64) -> AppResult<Reservation> {
        let tx = pool.write_tx()?;

        let changed = queries::mark_confirmed(&tx, id, &Utc::now())?;
        let reservation = queries::load_reservation(&tx, id)?
            .ok_or_else(|| AppError::NotFound(format!("reservation {}", id)))?;

        if changed > 0 {
            audit(
                &tx,
                "confirm",
                &format!("reservation {}", id),
                &format!(
                    "Student {} confirmed {} at {}",
                    reservation.student_id,
                    reservation.subject,
                    reservation.cell()
                ),
            )?;
        }
        tx.commit()?;

        Ok(reservation)
    }

    pub fn set_outcome(pool: &mut DbPool, id: i64, outcome: Outcome) -> AppResult<Reservation> {
        let tx = pool.write_tx()?;

        if queries::update_outcome(&tx, id, &outcome)? == 0 {
            return Err(AppError::NotFound(format!("reservation {}", id)));
        }
        let reservation = queries::load_reservation(&tx, id)?
            .ok_or_else(|| AppError::NotFound(format!("reservation {}", id)))?;

        audit(
            &tx,
            "outcome",
            &format!("reservation {}", id),
            &format!(
                "attended={} submitted_work={}",
                reservation.attended, reservation.submitted_work
            ),
        )?;
        tx.commit()?;

        Ok(reservation)
    }
}
