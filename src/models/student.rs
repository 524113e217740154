use chrono::{DateTime, Utc};
use serde::Serialize;

/// Directory view of a student. The reservation engine references students
/// by id and never edits these records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    pub id: i64,
    pub full_name: String,
    pub chat_id: Option<i64>,   // ⇔ bot user id, set when the student links the chat
    pub class_num: Option<u8>,  // 9 → OGE subjects, 10/11 → EGE subjects
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl StudentRecord {
    pub fn new(id: i64, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            chat_id: None,
            class_num: None,
            confirmed_at: None,
        }
    }
}
