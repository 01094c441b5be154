//! Gateway-driven entry points.
//!
//! Each function reads what it needs, builds any clash state fresh, runs the
//! pure engine and, where the operation writes, hands the result back to the
//! gateway in one call.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::{compute_availability, AvailabilityReport};
use crate::clash::ClashDetector;
use crate::errors::{TimeError, TimeResult};
use crate::gateway::{AssignmentFilter, EntryFilter, StatusCounts, TimetableGateway};
use crate::generator::{
    detect_clashes, generate_with, ClashRecord, GenerationOutcome, UnassignedAssignment,
    REASON_AT_CAP,
};
use crate::models::{Placement, TeachingAssignment, TimetableEntry};
use crate::validator::{validate_timetable, AuditContext, ValidationReport};
use crate::MAX_ENTRIES_PER_ASSIGNMENT;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub semester: String,
    pub year: i32,
    #[serde(flatten)]
    pub filter: AssignmentFilter,
    /// Report placements without writing them.
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Persisted entries; empty on a dry run.
    pub created: Vec<TimetableEntry>,
    pub placed: Vec<Placement>,
    pub unassigned: Vec<UnassignedAssignment>,
}

/// Places every pending assignment matching the request and commits the
/// placements in one gateway call.
///
/// The detector is seeded with the lecturer commitments of entries that are
/// already live, so a run never double-books a lecturer against earlier
/// selections. Assignments already holding the maximum number of entries are
/// reported as unassigned, and the gateway confirms those that reach it.
pub async fn run_generation(
    gateway: &dyn TimetableGateway,
    request: &GenerationRequest,
) -> TimeResult<GenerationReport> {
    if request.semester.trim().is_empty() {
        return Err(TimeError::Validation("Semester must not be empty".to_string()));
    }

    let slots = gateway
        .fetch_timeslots(&request.semester, request.year)
        .await?;
    if slots.is_empty() {
        return Err(TimeError::Validation(format!(
            "No time slots available for semester {} of {}",
            request.semester, request.year
        )));
    }
    let assignments = gateway.fetch_pending_assignments(&request.filter).await?;
    let live = gateway.fetch_live_entries(&EntryFilter::default()).await?;

    let mut held: HashMap<Uuid, usize> = HashMap::new();
    for entry in &live {
        *held.entry(entry.assignment_id).or_default() += 1;
    }
    let (eligible, full): (Vec<TeachingAssignment>, Vec<TeachingAssignment>) = assignments
        .iter()
        .cloned()
        .partition(|a| held.get(&a.id).copied().unwrap_or(0) < MAX_ENTRIES_PER_ASSIGNMENT);

    let detector = ClashDetector::lecturers_from_entries(&live);
    let GenerationOutcome {
        placed,
        mut unassigned,
    } = generate_with(detector, &eligible, &slots);
    unassigned.extend(full.iter().map(|a| UnassignedAssignment {
        assignment_id: a.id,
        reason: REASON_AT_CAP.to_string(),
    }));
    let position: HashMap<Uuid, usize> = assignments
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id, i))
        .collect();
    unassigned.sort_by_key(|u| position.get(&u.assignment_id).copied());

    let created = if request.dry_run || placed.is_empty() {
        Vec::new()
    } else {
        let drafts: Vec<TimetableEntry> = placed
            .iter()
            .cloned()
            .map(|p| p.into_entry(Uuid::new_v4()))
            .collect();
        gateway
            .insert_entries(&drafts, MAX_ENTRIES_PER_ASSIGNMENT)
            .await?
    };

    info!(
        semester = %request.semester,
        year = request.year,
        created = created.len(),
        unassigned = unassigned.len(),
        dry_run = request.dry_run,
        "generation run committed"
    );
    Ok(GenerationReport {
        created,
        placed,
        unassigned,
    })
}

pub async fn availability_for(
    gateway: &dyn TimetableGateway,
    assignment_id: Uuid,
) -> TimeResult<AvailabilityReport> {
    gateway
        .fetch_assignment(assignment_id)
        .await?
        .ok_or_else(|| {
            TimeError::NotFound(format!(
                "Teaching assignment with ID {} not found",
                assignment_id
            ))
        })?;
    let live = gateway.fetch_live_entries(&EntryFilter::default()).await?;
    Ok(compute_availability(assignment_id, &live))
}

pub async fn clashes(
    gateway: &dyn TimetableGateway,
    filter: &EntryFilter,
) -> TimeResult<Vec<ClashRecord>> {
    let live = gateway.fetch_live_entries(filter).await?;
    Ok(detect_clashes(&live))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(flatten)]
    pub report: ValidationReport,
    pub clashes: Vec<ClashRecord>,
}

/// Audits the live timetable, reading student counts and room capacities for
/// every entry in scope.
pub async fn audit_timetable(
    gateway: &dyn TimetableGateway,
    filter: &EntryFilter,
) -> TimeResult<AuditReport> {
    let live = gateway.fetch_live_entries(filter).await?;

    let assignment_ids: Vec<Uuid> = live
        .iter()
        .map(|e| e.assignment_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let room_ids: Vec<Uuid> = live
        .iter()
        .map(|e| e.room_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let context = AuditContext {
        student_counts: gateway
            .fetch_assignments(&assignment_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a.student_count))
            .collect(),
        room_capacities: gateway
            .fetch_rooms(&room_ids)
            .await?
            .into_iter()
            .map(|(id, room)| (id, room.capacity))
            .collect(),
    };

    let report = validate_timetable(&live, &context)?;
    Ok(AuditReport {
        report,
        clashes: detect_clashes(&live),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableStats {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total_entries: usize,
    /// Pending plus confirmed; cancelled assignments are left out.
    pub total_assignments: usize,
    pub clash_count: usize,
}

/// Headline numbers for the whole timetable.
pub async fn timetable_stats(gateway: &dyn TimetableGateway) -> TimeResult<TimetableStats> {
    let counts = gateway.count_statuses().await?;
    let live = gateway.fetch_live_entries(&EntryFilter::default()).await?;

    Ok(TimetableStats {
        counts,
        total_entries: counts.active_entries + counts.cancelled_entries,
        total_assignments: counts.pending_assignments + counts.confirmed_assignments,
        clash_count: detect_clashes(&live).len(),
    })
}
