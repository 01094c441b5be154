use std::collections::HashMap;

use async_trait::async_trait;
use mockall::mock;
use timetable_core::{
    errors::TimeResult,
    gateway::{AssignmentFilter, CommittedEntry, EntryFilter, StatusCounts, TimetableGateway},
    models::{AssignmentStatus, Room, TeachingAssignment, TimeSlotCandidate, TimetableEntry},
};
use uuid::Uuid;

// Mock gateway for testing
mock! {
    pub Gateway {}

    #[async_trait]
    impl TimetableGateway for Gateway {
        async fn fetch_pending_assignments(
            &self,
            filter: &AssignmentFilter,
        ) -> TimeResult<Vec<TeachingAssignment>>;

        async fn fetch_assignment(&self, id: Uuid) -> TimeResult<Option<TeachingAssignment>>;

        async fn fetch_assignments(&self, ids: &[Uuid]) -> TimeResult<Vec<TeachingAssignment>>;

        async fn fetch_timeslots(
            &self,
            semester: &str,
            year: i32,
        ) -> TimeResult<Vec<TimeSlotCandidate>>;

        async fn fetch_live_entries(
            &self,
            filter: &EntryFilter,
        ) -> TimeResult<Vec<TimetableEntry>>;

        async fn fetch_rooms(&self, ids: &[Uuid]) -> TimeResult<HashMap<Uuid, Room>>;

        async fn insert_entry(
            &self,
            entry: &TimetableEntry,
            cap: usize,
        ) -> TimeResult<CommittedEntry>;

        async fn insert_entries(
            &self,
            entries: &[TimetableEntry],
            cap: usize,
        ) -> TimeResult<Vec<TimetableEntry>>;

        async fn delete_entry(&self, id: Uuid) -> TimeResult<()>;

        async fn update_assignment_status(
            &self,
            id: Uuid,
            status: AssignmentStatus,
        ) -> TimeResult<()>;

        async fn count_statuses(&self) -> TimeResult<StatusCounts>;
    }
}
