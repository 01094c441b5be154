mod assignments_test;
mod middleware_test;
mod timetable_test;
