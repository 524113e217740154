pub mod reminder;
pub mod reservation;
pub mod slot;
pub mod student;
pub mod trial_event;
