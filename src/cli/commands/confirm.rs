use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::lifecycle::ConfirmationLifecycle;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    if let Commands::Confirm { id } = cmd {
        let mut pool = DbPool::from_config(cfg)?;
        let reservation = ConfirmationLifecycle::confirm(&mut pool, *id)?;

        if as_json {
            super::print_json(&reservation)?;
        } else {
            success(format!("Reservation {} confirmed.", super::describe(&reservation)));
        }
    }

    Ok(())
}
