pub mod allocator;
pub mod catalog;
pub mod lifecycle;
pub mod log;
pub mod reminders;
