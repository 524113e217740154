use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReminderKind {
    /// Enrollment confirmed over a day ago, still nothing booked.
    #[serde(rename = "reminder_24h")]
    PostConfirmation,
    #[serde(rename = "reminder_3d")]
    ThreeDays,
    #[serde(rename = "reminder_1d")]
    OneDay,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::PostConfirmation => "reminder_24h",
            ReminderKind::ThreeDays => "reminder_3d",
            ReminderKind::OneDay => "reminder_1d",
        }
    }
}

/// One notification the delivery layer should send. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderCandidate {
    pub kind: ReminderKind,
    pub student_id: i64,
    pub chat_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_time: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DueReminders {
    #[serde(rename = "reminder_24h")]
    pub post_confirmation: Vec<ReminderCandidate>,
    #[serde(rename = "reminder_3d")]
    pub three_days: Vec<ReminderCandidate>,
    #[serde(rename = "reminder_1d")]
    pub one_day: Vec<ReminderCandidate>,
}

impl DueReminders {
    pub fn total(&self) -> usize {
        self.post_confirmation.len() + self.three_days.len() + self.one_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReminderCandidate> {
        self.post_confirmation
            .iter()
            .chain(self.three_days.iter())
            .chain(self.one_day.iter())
    }
}
