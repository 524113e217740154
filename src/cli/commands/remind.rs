use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::reminders::ReminderLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::reminder::DueReminders;
use crate::ui::messages::{error, info};
use crate::utils::table::Table;
use crate::utils::time::parse_now;

fn print_table(due: &DueReminders) {
    if due.is_empty() {
        info("No reminders due.");
        return;
    }

    let mut table = Table::new(["KIND", "STUDENT", "CHAT", "RESERVATION", "MESSAGE"]);
    for c in due.iter() {
        table.add_row(vec![
            c.kind.as_str().to_string(),
            c.student_id.to_string(),
            c.chat_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            c.reservation_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".into()),
            c.message.clone(),
        ]);
    }
    print!("{}", table.render());
}

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    if let Commands::Remind { now, watch } = cmd {
        if *watch {
            info(format!(
                "Watching for reminders every {}s (activation poll {}s)",
                cfg.reminder_interval_secs, cfg.activation_poll_secs
            ));
            ReminderLogic::watch(cfg, |due| match serde_json::to_string(due) {
                Ok(line) => println!("{}", line),
                Err(e) => error(format!("Cannot serialize reminders: {}", e)),
            });
        }

        let now = parse_now(now.as_deref())?;
        let mut pool = DbPool::from_config(cfg)?;
        let due = ReminderLogic::collect(&mut pool, now)?;

        if as_json {
            super::print_json(&due)?;
        } else {
            print_table(&due);
        }
    }

    Ok(())
}
