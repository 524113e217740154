use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::allocator::SlotAllocator;
use crate::core::catalog::EventCatalog;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::utils::colors::{RESET, color_for_available};
use crate::utils::date::require_date;
use crate::utils::table::Table;
use serde_json::json;

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    if let Commands::Availability {
        campus,
        date,
        event,
    } = cmd
    {
        let date = require_date(date)?;
        let mut pool = DbPool::from_config(cfg)?;

        let event_id = match event {
            Some(id) => *id,
            None => {
                EventCatalog::active_event(&mut pool)?
                    .ok_or(AppError::NoActiveEvent)?
                    .id
            }
        };

        let seats = SlotAllocator::available_seats(&mut pool, event_id, campus, date)?;

        if as_json {
            super::print_json(&json!({
                "event_id": event_id,
                "campus": campus,
                "date": date,
                "slots": seats,
            }))?;
            return Ok(());
        }

        println!("🪑 {} {} (event {})\n", campus, date.format("%Y-%m-%d"), event_id);

        let mut table = Table::new(["TIME", "BOOKED", "CAPACITY", "AVAILABLE"]);
        for s in &seats {
            table.add_row(vec![
                s.time.clone(),
                s.booked.to_string(),
                s.capacity.to_string(),
                format!(
                    "{}{}{}",
                    color_for_available(s.available, s.capacity),
                    s.available,
                    RESET
                ),
            ]);
        }
        print!("{}", table.render());
    }

    Ok(())
}
