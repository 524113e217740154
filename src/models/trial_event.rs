//! Trial-exam event ("probnik") definitions: per-campus exam days, allowed
//! times and seat capacities.

use crate::errors::{AppError, AppResult};
use crate::utils::time::normalize_time_label;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One exam day offered by a campus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDay {
    pub label: String,
    pub date: NaiveDate,
    /// Empty means "inherit the campus or event time list".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub times: Vec<String>,
}

/// Schedule and capacities of one campus inside an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampusSchedule {
    #[serde(default)]
    pub days: Vec<ExamDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<String>>,
    /// time label → seats
    #[serde(default)]
    pub capacity: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_capacity: Option<u32>,
}

impl CampusSchedule {
    pub fn day(&self, date: NaiveDate) -> Option<&ExamDay> {
        self.days.iter().find(|d| d.date == date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialEvent {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub max_reservations: u32,
    pub default_times: Vec<String>,
    pub default_capacity: u32,
    pub campuses: BTreeMap<String, CampusSchedule>,
    pub created_at: String,
}

impl TrialEvent {
    pub fn campus(&self, name: &str) -> Option<&CampusSchedule> {
        self.campuses.get(name.trim())
    }

    /// Allowed times for a (campus, date): the day's own list, else the
    /// campus list, else the event-wide default. `None` when the campus does
    /// not hold the exam on that date.
    pub fn times_for(&self, campus: &str, date: NaiveDate) -> Option<&[String]> {
        let schedule = self.campus(campus)?;
        let day = schedule.day(date)?;

        if !day.times.is_empty() {
            return Some(&day.times);
        }
        match &schedule.times {
            Some(times) if !times.is_empty() => Some(times),
            _ => Some(&self.default_times),
        }
    }

    pub fn offers(&self, campus: &str, date: NaiveDate, time: &str) -> bool {
        self.times_for(campus, date)
            .is_some_and(|times| times.iter().any(|t| t == time))
    }

    /// Seats of a cell: explicit per-time override, then campus default,
    /// then the event default.
    pub fn capacity_for(&self, campus: &str, time: &str) -> u32 {
        match self.campus(campus) {
            Some(schedule) => schedule
                .capacity
                .get(time)
                .copied()
                .or(schedule.default_capacity)
                .unwrap_or(self.default_capacity),
            None => self.default_capacity,
        }
    }

    /// Canonicalize every time label ("09:00" → "9:00") and check the
    /// definition is usable.
    pub fn normalize(&mut self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidEvent("event name is empty".into()));
        }
        if self.max_reservations == 0 {
            return Err(AppError::InvalidEvent(
                "max_reservations must be at least 1".into(),
            ));
        }

        self.default_times = normalize_all(&self.default_times)?;

        for (name, schedule) in self.campuses.iter_mut() {
            if name.trim().is_empty() {
                return Err(AppError::InvalidEvent("campus name is empty".into()));
            }
            if name.trim() != name {
                return Err(AppError::InvalidEvent(format!(
                    "campus name '{}' has surrounding whitespace",
                    name
                )));
            }
            if let Some(times) = &schedule.times {
                schedule.times = Some(normalize_all(times)?);
            }
            for day in schedule.days.iter_mut() {
                day.times = normalize_all(&day.times)?;
            }

            let mut dates: Vec<NaiveDate> = schedule.days.iter().map(|d| d.date).collect();
            dates.sort();
            dates.dedup();
            if dates.len() != schedule.days.len() {
                return Err(AppError::InvalidEvent(format!(
                    "campus '{}' lists the same date twice",
                    name
                )));
            }

            let mut capacity = BTreeMap::new();
            for (time, seats) in &schedule.capacity {
                let label = normalize_time_label(time)?;
                if capacity.insert(label.clone(), *seats).is_some() {
                    return Err(AppError::InvalidEvent(format!(
                        "campus '{}' sets the capacity of {} twice",
                        name, label
                    )));
                }
            }
            schedule.capacity = capacity;
        }

        Ok(())
    }
}

fn normalize_all(times: &[String]) -> AppResult<Vec<String>> {
    times.iter().map(|t| normalize_time_label(t)).collect()
}

/// Operator-supplied definition of a new event (YAML or JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub max_reservations: Option<u32>,
    #[serde(default)]
    pub default_times: Option<Vec<String>>,
    #[serde(default)]
    pub default_capacity: Option<u32>,
    #[serde(default)]
    pub campuses: BTreeMap<String, CampusSchedule>,
}

impl EventDefinition {
    /// Fill unset fields from the configured defaults.
    pub fn into_event(
        self,
        default_quota: u32,
        default_times: &[String],
        default_capacity: u32,
        created_at: String,
    ) -> AppResult<TrialEvent> {
        let mut ev = TrialEvent {
            id: 0,
            name: self.name,
            is_active: self.is_active,
            max_reservations: self.max_reservations.unwrap_or(default_quota),
            default_times: self
                .default_times
                .unwrap_or_else(|| default_times.to_vec()),
            default_capacity: self.default_capacity.unwrap_or(default_capacity),
            campuses: self.campuses,
            created_at,
        };
        ev.normalize()?;
        Ok(ev)
    }
}

/// Partial update of an existing event. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub max_reservations: Option<u32>,
    #[serde(default)]
    pub default_times: Option<Vec<String>>,
    #[serde(default)]
    pub default_capacity: Option<u32>,
    #[serde(default)]
    pub campuses: Option<BTreeMap<String, CampusSchedule>>,
}

impl EventPatch {
    /// True when the patch can change which (campus, date, time) cells exist.
    pub fn touches_schedule(&self) -> bool {
        self.default_times.is_some() || self.campuses.is_some()
    }

    pub fn apply(self, ev: &mut TrialEvent) -> AppResult<()> {
        if let Some(name) = self.name {
            ev.name = name;
        }
        if let Some(active) = self.is_active {
            ev.is_active = active;
        }
        if let Some(max) = self.max_reservations {
            ev.max_reservations = max;
        }
        if let Some(times) = self.default_times {
            ev.default_times = times;
        }
        if let Some(cap) = self.default_capacity {
            ev.default_capacity = cap;
        }
        if let Some(campuses) = self.campuses {
            ev.campuses = campuses;
        }
        ev.normalize()
    }
}
