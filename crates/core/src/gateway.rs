//! # Persistence Gateway
//!
//! The engine never talks to storage directly. Everything it reads or writes
//! goes through [`TimetableGateway`], which the `timetable-db` crate
//! implements over Postgres.
//!
//! Two writes are check-then-act in the engine and must be closed by the
//! implementation:
//!
//! - [`TimetableGateway::insert_entry`] must refuse, atomically with the
//!   insert, an entry whose exact window is already held by a live entry of
//!   another assignment, or whose assignment already holds `cap` live entries.
//!   The assignment's status moves in the same transaction.
//! - [`TimetableGateway::insert_entries`] must write the whole batch or
//!   nothing, and refuse it if a lecturer in the batch already holds an
//!   overlapping live entry or an assignment would exceed `cap`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TimeResult;
use crate::models::{
    AssignmentStatus, Room, TeachingAssignment, TimeSlotCandidate, TimeWindow, TimetableEntry,
};

/// Outcome of a guarded insert, read inside the writing transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedEntry {
    pub entry: TimetableEntry,
    /// Live entries the assignment holds after the insert.
    pub live_count: usize,
    pub status: AssignmentStatus,
}

/// Row counts by status across the whole timetable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub active_entries: usize,
    pub cancelled_entries: usize,
    pub pending_assignments: usize,
    pub confirmed_assignments: usize,
    pub cancelled_assignments: usize,
}

/// Narrows which pending assignments a generation run considers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFilter {
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
}

/// Narrows which live entries are read. An empty filter reads all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
    pub assignment_id: Option<Uuid>,
    pub lecturer_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    /// Exact window match.
    pub window: Option<TimeWindow>,
}

impl EntryFilter {
    pub fn for_assignment(assignment_id: Uuid) -> Self {
        Self {
            assignment_id: Some(assignment_id),
            ..Self::default()
        }
    }

    pub fn at_window(window: TimeWindow) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &TimetableEntry) -> bool {
        self.assignment_id.map_or(true, |id| entry.assignment_id == id)
            && self.lecturer_id.map_or(true, |id| entry.lecturer_id == id)
            && self.room_id.map_or(true, |id| entry.room_id == id)
            && self.course_id.map_or(true, |id| entry.course_id == id)
            && self.window.map_or(true, |w| entry.window == w)
    }
}

#[async_trait]
pub trait TimetableGateway: Send + Sync {
    /// Pending assignments in a stable order; generation relies on it.
    async fn fetch_pending_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> TimeResult<Vec<TeachingAssignment>>;

    async fn fetch_assignment(&self, id: Uuid) -> TimeResult<Option<TeachingAssignment>>;

    async fn fetch_assignments(&self, ids: &[Uuid]) -> TimeResult<Vec<TeachingAssignment>>;

    /// Candidate slots offered for a term, in a stable order.
    async fn fetch_timeslots(&self, semester: &str, year: i32)
        -> TimeResult<Vec<TimeSlotCandidate>>;

    /// Live entries ordered by creation time.
    async fn fetch_live_entries(&self, filter: &EntryFilter) -> TimeResult<Vec<TimetableEntry>>;

    async fn fetch_rooms(&self, ids: &[Uuid]) -> TimeResult<HashMap<Uuid, Room>>;

    /// Inserts one entry, failing with `TimeError::Conflict` if the exact
    /// window is taken by another assignment or the assignment already holds
    /// `cap` live entries. The assignment becomes `confirmed` when it reaches
    /// `cap` and `pending` otherwise; a cancelled assignment keeps its status.
    async fn insert_entry(&self, entry: &TimetableEntry, cap: usize)
        -> TimeResult<CommittedEntry>;

    /// Inserts all entries in one transaction, failing with
    /// `TimeError::Conflict` if any entry's lecturer is already committed to
    /// an overlapping live window or any assignment would hold more than
    /// `cap` live entries. Assignments that reach `cap` are confirmed in the
    /// same transaction.
    async fn insert_entries(
        &self,
        entries: &[TimetableEntry],
        cap: usize,
    ) -> TimeResult<Vec<TimetableEntry>>;

    async fn delete_entry(&self, id: Uuid) -> TimeResult<()>;

    async fn update_assignment_status(&self, id: Uuid, status: AssignmentStatus)
        -> TimeResult<()>;

    async fn count_statuses(&self) -> TimeResult<StatusCounts>;
}
