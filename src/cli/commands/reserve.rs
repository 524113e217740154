use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::allocator::{AdmissionPolicy, SlotAllocator};
use crate::db::pool::DbPool;
use crate::directory::{SqliteDirectory, StudentDirectory};
use crate::errors::{AppError, AppResult};
use crate::models::reservation::ReservationRequest;
use crate::ui::messages::success;
use crate::utils::date::require_date;

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    if let Commands::Reserve {
        student,
        subject,
        campus,
        date,
        time,
        skip_subject_check,
    } = cmd
    {
        let date = require_date(date)?;
        let mut pool = DbPool::from_config(cfg)?;

        // subject legality is the caller's job, the allocator never checks it
        if !skip_subject_check {
            let directory = SqliteDirectory::new(&pool.conn);
            let record = directory
                .find_student(*student)?
                .ok_or_else(|| AppError::NotFound(format!("student {}", student)))?;
            directory.check_subject(&record, subject.trim())?;
        }

        let req = ReservationRequest::new(
            *student,
            subject.as_str(),
            campus.as_str(),
            date,
            time.as_str(),
        );
        let reservation =
            SlotAllocator::request_reservation(&mut pool, req, &AdmissionPolicy::from_config(cfg))?;

        if as_json {
            super::print_json(&reservation)?;
        } else {
            success(format!("Reservation {} created.", super::describe(&reservation)));
        }
    }

    Ok(())
}
