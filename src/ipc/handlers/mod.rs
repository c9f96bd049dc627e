pub mod analytics;
pub mod conflicts;
pub mod core;
pub mod exams;
pub mod notifications;
pub mod resolution;
pub mod setup;
pub mod timetable;
