use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::allocator::SlotAllocator;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    if let Commands::List { student, event } = cmd {
        let mut pool = DbPool::from_config(cfg)?;
        let rows = SlotAllocator::student_reservations(&mut pool, *student, *event)?;

        if as_json {
            return super::print_json(&rows);
        }

        if rows.is_empty() {
            info(format!("No reservations for student {}.", student));
            return Ok(());
        }

        println!("📋 Reservations of student {}:\n", student);
        print!("{}", super::reservation_table(&rows).render());
    }

    Ok(())
}
