use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assignment::TeachingAssignment;
use super::time::{ClockTime, SlotDuration, TimeWindow, Weekday};
use crate::errors::{TimeError, TimeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Cancelled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Active => "active",
            EntryStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntryStatus::Active),
            "cancelled" => Ok(EntryStatus::Cancelled),
            other => Err(TimeError::Validation(format!(
                "Unknown entry status: {}",
                other
            ))),
        }
    }
}

/// A materialized weekly session of a teaching assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub lecturer_id: Uuid,
    pub unit_id: Uuid,
    pub course_id: Uuid,
    pub room_id: Uuid,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub status: EntryStatus,
}

impl TimetableEntry {
    /// An active entry for `assignment` at `window`.
    pub fn for_assignment(id: Uuid, assignment: &TeachingAssignment, window: TimeWindow) -> Self {
        Self {
            id,
            assignment_id: assignment.id,
            lecturer_id: assignment.lecturer_id,
            unit_id: assignment.unit_id,
            course_id: assignment.course_id,
            room_id: assignment.room_id,
            window,
            status: EntryStatus::Active,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == EntryStatus::Active
    }

    /// The lecturer, room and student-cohort commitments this entry claims.
    pub fn commitments(&self) -> [ScheduleCommitment; 3] {
        [
            ScheduleCommitment::new(EntityKind::Lecturer, self.lecturer_id, self.window),
            ScheduleCommitment::new(EntityKind::Room, self.room_id, self.window),
            ScheduleCommitment::new(EntityKind::Student, self.course_id, self.window),
        ]
    }
}

/// Who a commitment binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lecturer,
    Room,
    /// A student cohort, keyed by course id.
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleCommitment {
    pub entity_kind: EntityKind,
    pub entity_id: Uuid,
    pub window: TimeWindow,
}

impl ScheduleCommitment {
    pub fn new(entity_kind: EntityKind, entity_id: Uuid, window: TimeWindow) -> Self {
        Self {
            entity_kind,
            entity_id,
            window,
        }
    }
}

/// A selectable weekly slot of legal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlotCandidate {
    #[serde(flatten)]
    pub window: TimeWindow,
    pub duration: SlotDuration,
}

impl TimeSlotCandidate {
    pub fn new(day: Weekday, start: ClockTime, end: ClockTime) -> TimeResult<Self> {
        Self::from_window(TimeWindow::new(day, start, end)?)
    }

    pub fn from_window(window: TimeWindow) -> TimeResult<Self> {
        let duration = SlotDuration::from_minutes(window.duration_minutes())?;
        Ok(Self { window, duration })
    }
}

/// A generated placement, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub assignment_id: Uuid,
    pub lecturer_id: Uuid,
    pub unit_id: Uuid,
    pub course_id: Uuid,
    pub room_id: Uuid,
    #[serde(flatten)]
    pub window: TimeWindow,
}

impl Placement {
    pub fn new(assignment: &TeachingAssignment, window: TimeWindow) -> Self {
        Self {
            assignment_id: assignment.id,
            lecturer_id: assignment.lecturer_id,
            unit_id: assignment.unit_id,
            course_id: assignment.course_id,
            room_id: assignment.room_id,
            window,
        }
    }

    pub fn into_entry(self, id: Uuid) -> TimetableEntry {
        TimetableEntry {
            id,
            assignment_id: self.assignment_id,
            lecturer_id: self.lecturer_id,
            unit_id: self.unit_id,
            course_id: self.course_id,
            room_id: self.room_id,
            window: self.window,
            status: EntryStatus::Active,
        }
    }
}
