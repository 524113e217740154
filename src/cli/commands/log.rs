use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use serde_json::json;

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let mut pool = DbPool::from_config(cfg)?;

        if as_json {
            let entries: Vec<_> = LogLogic::entries(&mut pool)?
                .into_iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "date": e.date,
                        "operation": e.operation,
                        "target": e.target,
                        "message": e.message,
                    })
                })
                .collect();
            super::print_json(&entries)?;
        } else {
            LogLogic::print_log(&mut pool)?;
        }
    }

    Ok(())
}
