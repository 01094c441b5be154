//! An in-process gateway that enforces the same write guarantees as the
//! Postgres one. Each call takes a single lock, so guarded inserts and batch
//! inserts are atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use timetable_core::{
    errors::{TimeError, TimeResult},
    gateway::{AssignmentFilter, CommittedEntry, EntryFilter, StatusCounts, TimetableGateway},
    models::{
        AssignmentStatus, EntryStatus, Room, TeachingAssignment, TimeSlotCandidate, TimeWindow,
        TimetableEntry,
    },
};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    assignments: Vec<TeachingAssignment>,
    rooms: HashMap<Uuid, Room>,
    timeslots: HashMap<(String, i32), Vec<TimeSlotCandidate>>,
    /// Insertion order doubles as creation order.
    entries: Vec<TimetableEntry>,
}

impl State {
    fn held(&self, assignment_id: Uuid) -> usize {
        self.entries
            .iter()
            .filter(|e| e.is_live() && e.assignment_id == assignment_id)
            .count()
    }

    /// Moves a non-cancelled assignment to `status` and reports where it ended up.
    fn set_status(&mut self, assignment_id: Uuid, status: AssignmentStatus) -> AssignmentStatus {
        match self.assignments.iter_mut().find(|a| a.id == assignment_id) {
            Some(assignment) if !assignment.is_cancelled() => {
                assignment.status = status;
                status
            }
            Some(assignment) => assignment.status,
            None => status,
        }
    }

    fn window_taken(&self, window: &TimeWindow) -> bool {
        self.entries
            .iter()
            .any(|e| e.is_live() && e.window == *window)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_room(&self, room: Room) {
        self.state.lock().await.rooms.insert(room.id, room);
    }

    pub async fn add_assignment(&self, assignment: TeachingAssignment) {
        self.state.lock().await.assignments.push(assignment);
    }

    pub async fn add_timeslots(&self, semester: &str, year: i32, slots: Vec<TimeSlotCandidate>) {
        self.state
            .lock()
            .await
            .timeslots
            .insert((semester.to_string(), year), slots);
    }

    /// Stores an entry without any guard, e.g. to seed a clashing timetable.
    pub async fn add_entry(&self, entry: TimetableEntry) {
        self.state.lock().await.entries.push(entry);
    }

    pub async fn entries(&self) -> Vec<TimetableEntry> {
        self.state.lock().await.entries.clone()
    }

    pub async fn assignment(&self, id: Uuid) -> Option<TeachingAssignment> {
        self.state
            .lock()
            .await
            .assignments
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }
}

#[async_trait]
impl TimetableGateway for InMemoryGateway {
    async fn fetch_pending_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> TimeResult<Vec<TeachingAssignment>> {
        let state = self.state.lock().await;
        Ok(state
            .assignments
            .iter()
            .filter(|a| a.status == AssignmentStatus::Pending)
            .filter(|a| filter.department_id.map_or(true, |id| a.department_id == id))
            .filter(|a| filter.course_id.map_or(true, |id| a.course_id == id))
            .cloned()
            .collect())
    }

    async fn fetch_assignment(&self, id: Uuid) -> TimeResult<Option<TeachingAssignment>> {
        Ok(self.assignment(id).await)
    }

    async fn fetch_assignments(&self, ids: &[Uuid]) -> TimeResult<Vec<TeachingAssignment>> {
        let state = self.state.lock().await;
        Ok(state
            .assignments
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn fetch_timeslots(
        &self,
        semester: &str,
        year: i32,
    ) -> TimeResult<Vec<TimeSlotCandidate>> {
        let state = self.state.lock().await;
        Ok(state
            .timeslots
            .get(&(semester.to_string(), year))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_live_entries(&self, filter: &EntryFilter) -> TimeResult<Vec<TimetableEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.is_live() && filter.matches(e))
            .cloned()
            .collect())
    }

    async fn fetch_rooms(&self, ids: &[Uuid]) -> TimeResult<HashMap<Uuid, Room>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.rooms.get(id).map(|room| (*id, room.clone())))
            .collect())
    }

    async fn insert_entry(&self, entry: &TimetableEntry, cap: usize) -> TimeResult<CommittedEntry> {
        let mut state = self.state.lock().await;

        let held = state.held(entry.assignment_id);
        if held >= cap {
            return Err(TimeError::Conflict(format!(
                "Assignment {} already holds {} slots",
                entry.assignment_id, cap
            )));
        }
        if state.window_taken(&entry.window) {
            return Err(TimeError::Conflict(format!(
                "Slot {} is already taken",
                entry.window
            )));
        }

        state.entries.push(entry.clone());
        let live_count = held + 1;
        let target = if live_count >= cap {
            AssignmentStatus::Confirmed
        } else {
            AssignmentStatus::Pending
        };
        let status = state.set_status(entry.assignment_id, target);
        Ok(CommittedEntry {
            entry: entry.clone(),
            live_count,
            status,
        })
    }

    async fn insert_entries(
        &self,
        entries: &[TimetableEntry],
        cap: usize,
    ) -> TimeResult<Vec<TimetableEntry>> {
        let mut state = self.state.lock().await;

        for (i, entry) in entries.iter().enumerate() {
            let earlier = entries[..i]
                .iter()
                .filter(|e| e.assignment_id == entry.assignment_id)
                .count();
            if state.held(entry.assignment_id) + earlier >= cap {
                return Err(TimeError::Conflict(format!(
                    "Assignment {} would exceed {} slots; nothing was committed",
                    entry.assignment_id, cap
                )));
            }

            let busy = state
                .entries
                .iter()
                .filter(|e| e.is_live())
                .chain(&entries[..i])
                .any(|e| e.lecturer_id == entry.lecturer_id && e.window.overlaps(&entry.window));
            if busy {
                return Err(TimeError::Conflict(format!(
                    "Lecturer {} was booked concurrently; nothing was committed",
                    entry.lecturer_id
                )));
            }
        }

        state.entries.extend(entries.iter().cloned());
        for entry in entries {
            if state.held(entry.assignment_id) >= cap {
                state.set_status(entry.assignment_id, AssignmentStatus::Confirmed);
            }
        }
        Ok(entries.to_vec())
    }

    async fn delete_entry(&self, id: Uuid) -> TimeResult<()> {
        self.state.lock().await.entries.retain(|e| e.id != id);
        Ok(())
    }

    async fn update_assignment_status(
        &self,
        id: Uuid,
        status: AssignmentStatus,
    ) -> TimeResult<()> {
        self.state.lock().await.set_status(id, status);
        Ok(())
    }

    async fn count_statuses(&self) -> TimeResult<StatusCounts> {
        let state = self.state.lock().await;
        let mut counts = StatusCounts::default();
        for entry in &state.entries {
            match entry.status {
                EntryStatus::Active => counts.active_entries += 1,
                EntryStatus::Cancelled => counts.cancelled_entries += 1,
            }
        }
        for assignment in &state.assignments {
            match assignment.status {
                AssignmentStatus::Pending => counts.pending_assignments += 1,
                AssignmentStatus::Confirmed => counts.confirmed_assignments += 1,
                AssignmentStatus::Cancelled => counts.cancelled_assignments += 1,
            }
        }
        Ok(counts)
    }
}
