//! Reminder scheduler.
//!
//! [`due_reminders`] is a pure function of "now" and the current state. It
//! keeps no memory of what was already sent: calling it twice on unchanged
//! state yields the same candidates twice, and the delivery layer owns
//! redelivery suppression.

use crate::config::Config;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::directory::{SqliteDirectory, StudentDirectory};
use crate::errors::AppResult;
use crate::models::reminder::{DueReminders, ReminderCandidate, ReminderKind};
use crate::models::reservation::Reservation;
use crate::models::student::StudentRecord;
use crate::models::trial_event::TrialEvent;
use crate::ui::messages::{error, info, warning};
use crate::utils::date::display_date;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::Duration as StdDuration;

const NUDGE_AFTER_HOURS: i64 = 24;

fn nudge_message() -> String {
    "Вы подтвердили регистрацию более 24 часов назад, но еще не записались на экзамен. \
     Пожалуйста, завершите регистрацию."
        .to_string()
}

fn exam_reminder(
    kind: ReminderKind,
    r: &Reservation,
    chat_id: Option<i64>,
) -> ReminderCandidate {
    let message = match kind {
        ReminderKind::PostConfirmation => nudge_message(),
        ReminderKind::OneDay => format!(
            "Завтра у вас экзамен по {} в {}. Подтвердите участие.",
            r.subject, r.exam_time
        ),
        ReminderKind::ThreeDays => format!(
            "Через 3 дня у вас экзамен по {} ({} в {}). Подтвердите участие.",
            r.subject,
            display_date(&r.exam_date),
            r.exam_time
        ),
    };

    ReminderCandidate {
        kind,
        student_id: r.student_id,
        chat_id,
        reservation_id: Some(r.id),
        subject: Some(r.subject.clone()),
        exam_date: Some(r.exam_date),
        exam_time: Some(r.exam_time.clone()),
        message,
    }
}

/// Classify the current state into the three reminder lists.
///
/// - nudge: enrollment confirmed at least 24h ago, nothing booked in the
///   active event;
/// - 3 days / 1 day: unconfirmed reservations of the active event whose exam
///   date is exactly that many calendar days after `now`.
///
/// Without an active event every list is empty.
pub fn due_reminders(
    now: DateTime<Utc>,
    active_event: Option<&TrialEvent>,
    reservations: &[Reservation],
    students: &[StudentRecord],
) -> DueReminders {
    let mut due = DueReminders::default();
    let Some(event) = active_event else {
        return due;
    };

    let in_event: Vec<&Reservation> = reservations
        .iter()
        .filter(|r| r.event_id == event.id)
        .collect();

    let booked: HashSet<i64> = in_event.iter().map(|r| r.student_id).collect();
    let chats: HashMap<i64, Option<i64>> = students.iter().map(|s| (s.id, s.chat_id)).collect();

    let nudge_cutoff = now - Duration::hours(NUDGE_AFTER_HOURS);
    for s in students {
        if let Some(confirmed_at) = s.confirmed_at
            && confirmed_at <= nudge_cutoff
            && !booked.contains(&s.id)
        {
            due.post_confirmation.push(ReminderCandidate {
                kind: ReminderKind::PostConfirmation,
                student_id: s.id,
                chat_id: s.chat_id,
                reservation_id: None,
                subject: None,
                exam_date: None,
                exam_time: None,
                message: nudge_message(),
            });
        }
    }

    let in_three_days = (now + Duration::days(3)).date_naive();
    let tomorrow = (now + Duration::days(1)).date_naive();

    for r in in_event.iter().filter(|r| !r.confirmed) {
        let chat_id = chats.get(&r.student_id).copied().flatten();
        if r.exam_date == in_three_days {
            due.three_days
                .push(exam_reminder(ReminderKind::ThreeDays, r, chat_id));
        }
        if r.exam_date == tomorrow {
            due.one_day.push(exam_reminder(ReminderKind::OneDay, r, chat_id));
        }
    }

    due
}

/// What the reminder loop carries from one iteration to the next.
#[derive(Debug, Clone)]
pub struct WatchState {
    interval: Duration,
    last_active: Option<i64>,
    next_run: Option<DateTime<Utc>>,
}

impl WatchState {
    /// The first batch is due immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_active: None,
            next_run: None,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let secs = cfg.reminder_interval_secs.max(1);
        Self::new(Duration::seconds(secs.min(u64::from(u32::MAX)) as i64))
    }

    pub fn last_active(&self) -> Option<i64> {
        self.last_active
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.next_run
    }
}

/// Outcome of one iteration of the reminder loop.
#[derive(Debug, Default)]
pub struct Tick {
    pub activation_changed: bool,
    pub batch: Option<DueReminders>,
}

pub struct ReminderLogic;

impl ReminderLogic {
    /// Load the current state and compute the due reminders at `now`.
    pub fn collect(pool: &mut DbPool, now: DateTime<Utc>) -> AppResult<DueReminders> {
        let Some(event) = queries::load_active_event(&pool.conn)? else {
            return Ok(DueReminders::default());
        };

        let reservations = queries::load_event_reservations(&pool.conn, event.id)?;
        let students = SqliteDirectory::new(&pool.conn).all_students()?;

        Ok(due_reminders(now, Some(&event), &reservations, &students))
    }

    /// One iteration of the reminder loop: poll the active event and report
    /// a change, then collect a batch if `next_run` has passed. A failed
    /// iteration leaves `next_run` as it was, so the batch is retried on the
    /// next poll.
    pub fn tick(
        state: &mut WatchState,
        pool: &mut DbPool,
        now: DateTime<Utc>,
    ) -> AppResult<Tick> {
        let mut tick = Tick::default();

        let active = queries::load_active_event(&pool.conn)?;
        let current = active.as_ref().map(|e| e.id);
        if current != state.last_active {
            match &active {
                Some(ev) => info(format!(
                    "Active event is now '{}' (id {})",
                    ev.name, ev.id
                )),
                None => warning("No active event"),
            }
            state.last_active = current;
            tick.activation_changed = true;
        }

        if state.next_run.is_none_or(|at| now >= at) {
            tick.batch = Some(Self::collect(pool, now)?);
            state.next_run = Some(now + state.interval);
        }

        Ok(tick)
    }

    /// Periodic driver: calls [`ReminderLogic::tick`] every
    /// `activation_poll_secs` (or sooner when the next batch is due) and hands
    /// each batch to `emit`. Failed iterations are reported and the loop goes
    /// on. Never returns.
    pub fn watch<F>(cfg: &Config, mut emit: F) -> !
    where
        F: FnMut(&DueReminders),
    {
        let poll = StdDuration::from_secs(cfg.activation_poll_secs.max(1));
        let mut state = WatchState::from_config(cfg);

        loop {
            match DbPool::from_config(cfg) {
                Ok(mut pool) => match Self::tick(&mut state, &mut pool, Utc::now()) {
                    Ok(tick) => {
                        if let Some(due) = &tick.batch {
                            emit(due);
                        }
                    }
                    Err(e) => error(format!("Reminder cycle failed: {}", e)),
                },
                Err(e) => error(format!("Cannot open database: {}", e)),
            }

            let until_run = state
                .next_run
                .map(|at| (at - Utc::now()).to_std().unwrap_or_default())
                .unwrap_or(poll);
            thread::sleep(poll.min(until_run).max(StdDuration::from_millis(100)));
        }
    }
}
