pub mod assignments;
pub mod timetable;
