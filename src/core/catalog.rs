//! Event catalog: trial-exam definitions and the single-active-event rule.
//!
//! Activation is one operation: the event being activated and the
//! deactivation of every other event commit in the same transaction. The
//! partial unique index on `trial_events(is_active)` backs this up at the
//! storage level.

use crate::config::{Config, OrphanPolicy};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::trial_event::{EventDefinition, EventPatch, TrialEvent};
use chrono::Utc;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub struct EventCatalog;

/// Reservations of `ev` whose cell the (possibly edited) schedule no
/// longer offers.
fn orphaned_count(conn: &Connection, ev: &TrialEvent) -> AppResult<usize> {
    let orphans = queries::load_event_reservations(conn, ev.id)?
        .iter()
        .filter(|r| !ev.offers(&r.campus, r.exam_date, &r.exam_time))
        .count();
    Ok(orphans)
}

impl EventCatalog {
    pub fn create_event(
        pool: &mut DbPool,
        def: EventDefinition,
        cfg: &Config,
    ) -> AppResult<TrialEvent> {
        let mut ev = def.into_event(
            cfg.default_quota,
            &cfg.default_times,
            cfg.default_capacity,
            Utc::now().to_rfc3339(),
        )?;

        let tx = pool.write_tx()?;

        if ev.is_active {
            queries::deactivate_all_except(&tx, 0)?;
        }
        ev.id = queries::insert_event(&tx, &ev)?;

        audit(
            &tx,
            "event_create",
            &format!("event {}", ev.id),
            &format!("Created '{}' (active: {})", ev.name, ev.is_active),
        )?;
        tx.commit()?;

        Ok(ev)
    }

    /// Apply a partial update. Schedule edits that would leave existing
    /// reservations outside the new schedule are refused under
    /// [`OrphanPolicy::Reject`]; under [`OrphanPolicy::Allow`] they are stored
    /// as given and existing reservations are left untouched.
    pub fn update_event(
        pool: &mut DbPool,
        id: i64,
        patch: EventPatch,
        policy: OrphanPolicy,
    ) -> AppResult<TrialEvent> {
        let tx = pool.write_tx()?;

        let mut ev = queries::load_event(&tx, id)?
            .ok_or_else(|| AppError::NotFound(format!("event {}", id)))?;

        let schedule_changed = patch.touches_schedule();
        patch.apply(&mut ev)?;

        if schedule_changed && policy == OrphanPolicy::Reject {
            let orphans = orphaned_count(&tx, &ev)?;
            if orphans > 0 {
                return Err(AppError::OrphanedReservations(orphans));
            }
        }

        if ev.is_active {
            queries::deactivate_all_except(&tx, ev.id)?;
        }
        queries::update_event(&tx, &ev)?;

        audit(
            &tx,
            "event_update",
            &format!("event {}", ev.id),
            &format!("Updated '{}' (active: {})", ev.name, ev.is_active),
        )?;
        tx.commit()?;

        Ok(ev)
    }

    pub fn set_active(pool: &mut DbPool, id: i64, active: bool) -> AppResult<TrialEvent> {
        let patch = EventPatch {
            is_active: Some(active),
            ..EventPatch::default()
        };
        Self::update_event(pool, id, patch, OrphanPolicy::Reject)
    }

    /// Delete an event. While reservations reference it the deletion is
    /// refused, unless `force` is set or the policy allows orphaning, in which
    /// case the reservations are deleted with it. Returns how many
    /// reservations went away.
    pub fn delete_event(
        pool: &mut DbPool,
        id: i64,
        force: bool,
        policy: OrphanPolicy,
    ) -> AppResult<usize> {
        let tx = pool.write_tx()?;

        let ev = queries::load_event(&tx, id)?
            .ok_or_else(|| AppError::NotFound(format!("event {}", id)))?;

        let referencing = queries::count_event_reservations(&tx, id)?;
        if referencing > 0 && !force && policy == OrphanPolicy::Reject {
            return Err(AppError::OrphanedReservations(referencing));
        }

        queries::delete_event(&tx, id)?;
        audit(
            &tx,
            "event_delete",
            &format!("event {}", id),
            &format!(
                "Deleted '{}' together with {} reservation(s)",
                ev.name, referencing
            ),
        )?;
        tx.commit()?;

        Ok(referencing)
    }

    pub fn active_event(pool: &mut DbPool) -> AppResult<Option<TrialEvent>> {
        queries::load_active_event(&pool.conn)
    }

    pub fn get_event(pool: &mut DbPool, id: i64) -> AppResult<TrialEvent> {
        queries::load_event(&pool.conn, id)?
            .ok_or_else(|| AppError::NotFound(format!("event {}", id)))
    }

    pub fn list_events(pool: &mut DbPool) -> AppResult<Vec<TrialEvent>> {
        queries::load_events(&pool.conn)
    }

    /// Read an event definition or patch from a YAML or JSON file.
    pub fn load_file<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
        let content = fs::read_to_string(path)?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(parsed)
    }
}
