use crate::cli::parser::{Commands, EventAction};
use crate::config::Config;
use crate::core::catalog::EventCatalog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::trial_event::{EventDefinition, EventPatch, TrialEvent};
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{GREEN, GREY, RESET};
use crate::utils::table::Table;

fn print_event(ev: &TrialEvent) {
    let state = if ev.is_active {
        format!("{GREEN}active{RESET}")
    } else {
        format!("{GREY}inactive{RESET}")
    };
    println!("🗓️  #{} {} ({})", ev.id, ev.name, state);
    println!(
        "   quota: {} | default times: {} | default capacity: {}\n",
        ev.max_reservations,
        ev.default_times.join(", "),
        ev.default_capacity
    );

    let mut table = Table::new(["CAMPUS", "LABEL", "DATE", "TIMES", "SEATS"]);
    for (campus, schedule) in &ev.campuses {
        for day in &schedule.days {
            let times = ev.times_for(campus, day.date).unwrap_or_default();
            let seats: Vec<String> = times
                .iter()
                .map(|t| format!("{}={}", t, ev.capacity_for(campus, t)))
                .collect();
            table.add_row(vec![
                campus.clone(),
                day.label.clone(),
                day.date.format("%Y-%m-%d").to_string(),
                times.join(", "),
                seats.join(" "),
            ]);
        }
    }
    if table.is_empty() {
        warning("No exam days configured.");
    } else {
        print!("{}", table.render());
    }
}

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    let Commands::Event { action } = cmd else {
        return Ok(());
    };
    let mut pool = DbPool::from_config(cfg)?;

    match action {
        EventAction::Active => {
            let active = EventCatalog::active_event(&mut pool)?;
            if as_json {
                return super::print_json(&active);
            }
            match active {
                Some(ev) => print_event(&ev),
                None => info("No trial exam is currently active."),
            }
        }

        EventAction::Create { file } => {
            let def: EventDefinition = EventCatalog::load_file(file)?;
            let ev = EventCatalog::create_event(&mut pool, def, cfg)?;
            if as_json {
                return super::print_json(&ev);
            }
            success(format!("Event #{} '{}' created.", ev.id, ev.name));
        }

        EventAction::Update { id, file } => {
            let patch: EventPatch = EventCatalog::load_file(file)?;
            let ev = EventCatalog::update_event(&mut pool, *id, patch, cfg.orphan_policy)?;
            if as_json {
                return super::print_json(&ev);
            }
            success(format!("Event #{} '{}' updated.", ev.id, ev.name));
        }

        EventAction::Activate { id } => {
            let ev = EventCatalog::set_active(&mut pool, *id, true)?;
            if as_json {
                return super::print_json(&ev);
            }
            success(format!("Event #{} '{}' is now active.", ev.id, ev.name));
        }

        EventAction::Deactivate { id } => {
            let ev = EventCatalog::set_active(&mut pool, *id, false)?;
            if as_json {
                return super::print_json(&ev);
            }
            success(format!("Event #{} '{}' deactivated.", ev.id, ev.name));
        }

        EventAction::Delete { id, force } => {
            let removed = EventCatalog::delete_event(&mut pool, *id, *force, cfg.orphan_policy)?;
            if as_json {
                return super::print_json(&serde_json::json!({
                    "deleted": id,
                    "reservations_removed": removed,
                }));
            }
            success(format!(
                "Event #{} deleted ({} reservation(s) removed).",
                id, removed
            ));
        }

        EventAction::List => {
            let events = EventCatalog::list_events(&mut pool)?;
            if as_json {
                return super::print_json(&events);
            }
            if events.is_empty() {
                info("No events defined.");
                return Ok(());
            }
            let mut table = Table::new(["ID", "NAME", "ACTIVE", "QUOTA", "CAMPUSES"]);
            for ev in &events {
                table.add_row(vec![
                    ev.id.to_string(),
                    ev.name.clone(),
                    if ev.is_active { "yes" } else { "no" }.to_string(),
                    ev.max_reservations.to_string(),
                    ev.campuses.keys().cloned().collect::<Vec<_>>().join(", "),
                ]);
            }
            print!("{}", table.render());
        }

        EventAction::Show { id } => {
            let ev = EventCatalog::get_event(&mut pool, *id)?;
            if as_json {
                return super::print_json(&ev);
            }
            print_event(&ev);
        }
    }

    Ok(())
}
