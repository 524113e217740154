use serde::Serialize;

/// Flat reservation row for the registration sheet handed to campus staff.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationExport {
    pub id: i64,
    pub event: String,
    pub student_id: i64,
    pub student_name: String,
    pub class_num: Option<u8>,
    pub subject: String,
    pub campus: String,
    pub exam_date: String,
    pub exam_time: String,
    pub state: String,
    pub confirmed_at: Option<String>,
    pub attended: bool,
    pub submitted_work: bool,
}

impl ReservationExport {
    pub const HEADERS: [&'static str; 13] = [
        "id",
        "event",
        "student_id",
        "student_name",
        "class",
        "subject",
        "campus",
        "exam_date",
        "exam_time",
        "state",
        "confirmed_at",
        "attended",
        "submitted_work",
    ];

    pub fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.event.clone(),
            self.student_id.to_string(),
            self.student_name.clone(),
            self.class_num.map(|c| c.to_string()).unwrap_or_default(),
            self.subject.clone(),
            self.campus.clone(),
            self.exam_date.clone(),
            self.exam_time.clone(),
            self.state.clone(),
            self.confirmed_at.clone().unwrap_or_default(),
            self.attended.to_string(),
            self.submitted_work.to_string(),
        ]
    }
}
