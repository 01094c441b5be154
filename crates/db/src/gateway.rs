//! Postgres implementation of the timetable persistence gateway.

use std::collections::HashMap;

use async_trait::async_trait;
use eyre::Result;
use timetable_core::{
    errors::{TimeError, TimeResult},
    gateway::{AssignmentFilter, CommittedEntry, EntryFilter, StatusCounts, TimetableGateway},
    models::{AssignmentStatus, Room, TeachingAssignment, TimeSlotCandidate, TimetableEntry},
};
use tracing::debug;
use uuid::Uuid;

use crate::repositories::{
    assignment, entry,
    entry::{BatchInsert, GuardedInsert},
    room, time_slot,
};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: DbPool,
}

impl PgGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

fn convert_all<T, U>(rows: Vec<T>, convert: impl Fn(T) -> Result<U>) -> TimeResult<Vec<U>> {
    rows.into_iter()
        .map(convert)
        .collect::<Result<Vec<_>>>()
        .map_err(TimeError::Database)
}

#[async_trait]
impl TimetableGateway for PgGateway {
    async fn fetch_pending_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> TimeResult<Vec<TeachingAssignment>> {
        let rows =
            assignment::get_pending_assignments(&self.pool, filter.department_id, filter.course_id)
                .await?;
        convert_all(rows, |row| row.into_assignment())
    }

    async fn fetch_assignment(&self, id: Uuid) -> TimeResult<Option<TeachingAssignment>> {
        assignment::get_assignment_by_id(&self.pool, id)
            .await?
            .map(|row| row.into_assignment())
            .transpose()
            .map_err(TimeError::Database)
    }

    async fn fetch_assignments(&self, ids: &[Uuid]) -> TimeResult<Vec<TeachingAssignment>> {
        let rows = assignment::get_assignments_by_ids(&self.pool, ids).await?;
        convert_all(rows, |row| row.into_assignment())
    }

    async fn fetch_timeslots(
        &self,
        semester: &str,
        year: i32,
    ) -> TimeResult<Vec<TimeSlotCandidate>> {
        let rows = time_slot::get_time_slots_by_term(&self.pool, semester, year).await?;
        convert_all(rows, |row| row.into_candidate())
    }

    async fn fetch_live_entries(&self, filter: &EntryFilter) -> TimeResult<Vec<TimetableEntry>> {
        let rows = entry::get_live_entries(&self.pool, filter).await?;
        convert_all(rows, |row| row.into_entry())
    }

    async fn fetch_rooms(&self, ids: &[Uuid]) -> TimeResult<HashMap<Uuid, Room>> {
        let rows = room::get_rooms_by_ids(&self.pool, ids).await?;
        let rooms = convert_all(rows, |row| row.into_room())?;
        Ok(rooms.into_iter().map(|room| (room.id, room)).collect())
    }

    async fn insert_entry(&self, entry: &TimetableEntry, cap: usize) -> TimeResult<CommittedEntry> {
        let cap = i64::try_from(cap).unwrap_or(i64::MAX);
        match entry::insert_entry_guarded(&self.pool, entry, cap).await? {
            GuardedInsert::Inserted {
                entry,
                live_count,
                status,
            } => Ok(CommittedEntry {
                entry: entry.into_entry().map_err(TimeError::Database)?,
                live_count: count(live_count),
                status: status.parse::<AssignmentStatus>()?,
            }),
            GuardedInsert::CapReached => Err(TimeError::Conflict(format!(
                "Assignment {} already holds {} slots",
                entry.assignment_id, cap
            ))),
            GuardedInsert::SlotTaken => Err(TimeError::Conflict(format!(
                "Slot {} is already taken",
                entry.window
            ))),
        }
    }

    async fn insert_entries(
        &self,
        entries: &[TimetableEntry],
        cap: usize,
    ) -> TimeResult<Vec<TimetableEntry>> {
        let cap = i64::try_from(cap).unwrap_or(i64::MAX);
        match entry::insert_entries(&self.pool, entries, cap).await? {
            BatchInsert::Inserted(rows) => {
                debug!(count = rows.len(), "committed generated entries");
                convert_all(rows, |row| row.into_entry())
            }
            BatchInsert::LecturerBusy(lecturer_id) => Err(TimeError::Conflict(format!(
                "Lecturer {} was booked concurrently; nothing was committed",
                lecturer_id
            ))),
            BatchInsert::CapReached(assignment_id) => Err(TimeError::Conflict(format!(
                "Assignment {} would exceed {} slots; nothing was committed",
                assignment_id, cap
            ))),
        }
    }

    async fn delete_entry(&self, id: Uuid) -> TimeResult<()> {
        entry::delete_entry(&self.pool, id).await?;
        Ok(())
    }

    async fn update_assignment_status(
        &self,
        id: Uuid,
        status: AssignmentStatus,
    ) -> TimeResult<()> {
        let updated = assignment::update_assignment_status(&self.pool, id, status.as_str()).await?;
        if updated == 0 {
            debug!(assignment = %id, "status left unchanged");
        }
        Ok(())
    }

    async fn count_statuses(&self) -> TimeResult<StatusCounts> {
        let mut counts = StatusCounts::default();
        for (status, n) in entry::count_by_status(&self.pool).await? {
            match status.as_str() {
                "active" => counts.active_entries = count(n),
                "cancelled" => counts.cancelled_entries = count(n),
                other => debug!(status = other, "ignoring unknown entry status"),
            }
        }
        for (status, n) in assignment::count_by_status(&self.pool).await? {
            match status.as_str() {
                "pending" => counts.pending_assignments = count(n),
                "confirmed" => counts.confirmed_assignments = count(n),
                "cancelled" => counts.cancelled_assignments = count(n),
                other => debug!(status = other, "ignoring unknown assignment status"),
            }
        }
        Ok(counts)
    }
}
