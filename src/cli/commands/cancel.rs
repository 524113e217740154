use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::allocator::SlotAllocator;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    if let Commands::Cancel { id } = cmd {
        let mut pool = DbPool::from_config(cfg)?;
        let reservation = SlotAllocator::cancel_reservation(&mut pool, *id)?;

        if as_json {
            super::print_json(&reservation)?;
        } else {
            success(format!("Reservation {} cancelled.", super::describe(&reservation)));
        }
    }

    Ok(())
}
