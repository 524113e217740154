use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::lifecycle::ConfirmationLifecycle;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::reservation::Outcome;
use crate::ui::messages::{success, warning};

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    if let Commands::Outcome {
        id,
        attended,
        submitted,
    } = cmd
    {
        let outcome = Outcome {
            attended: *attended,
            submitted_work: *submitted,
        };
        if outcome.is_empty() {
            warning("Nothing to update: pass --attended and/or --submitted.");
            return Ok(());
        }

        let mut pool = DbPool::from_config(cfg)?;
        let reservation = ConfirmationLifecycle::set_outcome(&mut pool, *id, outcome)?;

        if as_json {
            super::print_json(&reservation)?;
        } else {
            success(format!(
                "Reservation #{}: attended={}, submitted_work={}",
                reservation.id, reservation.attended, reservation.submitted_work
            ));
        }
    }

    Ok(())
}
