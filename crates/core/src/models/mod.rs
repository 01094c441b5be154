pub mod assignment;
pub mod entry;
pub mod time;

pub use assignment::{AssignmentStatus, Room, TeachingAssignment};
pub use entry::{
    EntityKind, EntryStatus, Placement, ScheduleCommitment, TimeSlotCandidate, TimetableEntry,
};
pub use time::{ClockTime, SlotDuration, TimeWindow, Weekday};
