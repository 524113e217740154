//! examslot library root.
//! Exposes the reservation engine (catalog, allocator, lifecycle, reminders),
//! the CLI parser and the high-level run() function.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod directory;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let json = cli.json;
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg, json),
        Commands::Event { .. } => cli::commands::event::handle(&cli.command, cfg, json),
        Commands::Student { .. } => cli::commands::student::handle(&cli.command, cfg, json),
        Commands::Reserve { .. } => cli::commands::reserve::handle(&cli.command, cfg, json),
        Commands::Availability { .. } => {
            cli::commands::availability::handle(&cli.command, cfg, json)
        }
        Commands::List { .. } => cli::commands::list::handle(&cli.command, cfg, json),
        Commands::Confirm { .. } => cli::commands::confirm::handle(&cli.command, cfg, json),
        Commands::Outcome { .. } => cli::commands::outcome::handle(&cli.command, cfg, json),
        Commands::Cancel { .. } => cli::commands::cancel::handle(&cli.command, cfg, json),
        Commands::Remind { .. } => cli::commands::remind::handle(&cli.command, cfg, json),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once; --db wins over the configured database
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }

    let result = dispatch(&cli, &cfg);

    // --json callers branch on the error code, not on the text
    if cli.json
        && let Err(e) = &result
    {
        println!(
            "{}",
            serde_json::json!({ "error": e.code(), "message": e.to_string() })
        );
    }

    result
}
