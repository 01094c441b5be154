//! # Commit / Withdraw Protocol
//!
//! An assignment moves `unconfirmed (0 entries) -> partial (1) -> confirmed
//! (2)` as slots are selected. Any withdrawal sends it back to pending, even
//! when one entry is still live afterwards.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{TimeError, TimeResult};
use crate::gateway::{CommittedEntry, EntryFilter, TimetableGateway};
use crate::models::{
    AssignmentStatus, SlotDuration, TeachingAssignment, TimeWindow, TimetableEntry,
};
use crate::MAX_ENTRIES_PER_ASSIGNMENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    Unconfirmed,
    Partial,
    Confirmed,
}

impl SelectionState {
    pub fn from_count(live_entries: usize) -> Self {
        match live_entries {
            0 => SelectionState::Unconfirmed,
            n if n < MAX_ENTRIES_PER_ASSIGNMENT => SelectionState::Partial,
            _ => SelectionState::Confirmed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub entry: TimetableEntry,
    pub live_count: usize,
    pub state: SelectionState,
    pub status: AssignmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalOutcome {
    pub assignment_id: Uuid,
    /// `None` when there was nothing to withdraw.
    pub removed_entry: Option<Uuid>,
    pub remaining: usize,
    pub status: AssignmentStatus,
}

/// Claims `window` for an assignment.
///
/// Fails with `Conflict` when the assignment is cancelled, already holds the
/// maximum number of entries, already holds this window, or another
/// assignment holds this exact window. The gateway re-checks both limits
/// and moves the assignment's status atomically with the insert.
pub async fn select_slot(
    gateway: &dyn TimetableGateway,
    assignment_id: Uuid,
    window: TimeWindow,
) -> TimeResult<SelectionOutcome> {
    SlotDuration::from_minutes(window.duration_minutes())?;
    let assignment = load_assignment(gateway, assignment_id).await?;
    if assignment.is_cancelled() {
        return Err(TimeError::Conflict(format!(
            "Assignment {} is cancelled",
            assignment_id
        )));
    }

    let held = gateway
        .fetch_live_entries(&EntryFilter::for_assignment(assignment_id))
        .await?;
    if held.len() >= MAX_ENTRIES_PER_ASSIGNMENT {
        return Err(TimeError::Conflict(format!(
            "Assignment {} already holds {} slots",
            assignment_id, MAX_ENTRIES_PER_ASSIGNMENT
        )));
    }
    if held.iter().any(|e| e.window == window) {
        return Err(TimeError::Conflict(format!(
            "Assignment {} already holds {}",
            assignment_id, window
        )));
    }

    let occupants = gateway
        .fetch_live_entries(&EntryFilter::at_window(window))
        .await?;
    if let Some(other) = occupants.iter().find(|e| e.assignment_id != assignment_id) {
        return Err(TimeError::Conflict(format!(
            "Slot {} is already taken by assignment {}",
            window, other.assignment_id
        )));
    }

    let draft = TimetableEntry::for_assignment(Uuid::new_v4(), &assignment, window);
    let CommittedEntry {
        entry,
        live_count,
        status,
    } = gateway
        .insert_entry(&draft, MAX_ENTRIES_PER_ASSIGNMENT)
        .await?;

    info!(
        assignment = %assignment_id,
        slot = %window,
        live_count,
        "slot selected"
    );
    Ok(SelectionOutcome {
        entry,
        live_count,
        state: SelectionState::from_count(live_count),
        status,
    })
}

/// Releases the assignment's most recently created entry and resets it to
/// pending. Does nothing when the assignment holds no entry.
pub async fn withdraw_slot(
    gateway: &dyn TimetableGateway,
    assignment_id: Uuid,
) -> TimeResult<WithdrawalOutcome> {
    let assignment = load_assignment(gateway, assignment_id).await?;
    let held = gateway
        .fetch_live_entries(&EntryFilter::for_assignment(assignment_id))
        .await?;

    let Some(latest) = held.last() else {
        debug!(assignment = %assignment_id, "nothing to withdraw");
        return Ok(WithdrawalOutcome {
            assignment_id,
            removed_entry: None,
            remaining: 0,
            status: assignment.status,
        });
    };

    gateway.delete_entry(latest.id).await?;

    // Cancellation is terminal and owned elsewhere.
    let status = if assignment.is_cancelled() {
        AssignmentStatus::Cancelled
    } else {
        gateway
            .update_assignment_status(assignment_id, AssignmentStatus::Pending)
            .await?;
        AssignmentStatus::Pending
    };

    info!(assignment = %assignment_id, entry = %latest.id, "slot withdrawn");
    Ok(WithdrawalOutcome {
        assignment_id,
        removed_entry: Some(latest.id),
        remaining: held.len() - 1,
        status,
    })
}

async fn load_assignment(
    gateway: &dyn TimetableGateway,
    assignment_id: Uuid,
) -> TimeResult<TeachingAssignment> {
    gateway
        .fetch_assignment(assignment_id)
        .await?
        .ok_or_else(|| {
            TimeError::NotFound(format!(
                "Teaching assignment with ID {} not found",
                assignment_id
            ))
        })
}
