//! # Timetable Generator
//!
//! Greedy first-fit placement of pending teaching assignments and the
//! pairwise audit over already materialized entries.
//!
//! The two passes check different things on purpose. Placement only rejects
//! a slot when the assignment's lecturer is already busy; room and cohort
//! collisions are reported afterwards by [`detect_clashes`]. Earlier
//! assignments in the input win contested slots, and the same ordered input
//! always yields the same outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clash::ClashDetector;
use crate::models::{EntityKind, Placement, TeachingAssignment, TimeSlotCandidate, TimetableEntry};

pub const REASON_NO_SLOT: &str = "no available slot without clash";
pub const REASON_CANCELLED: &str = "assignment cancelled";
pub const REASON_AT_CAP: &str = "assignment already holds its maximum slots";

/// An assignment the generator could not place, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedAssignment {
    pub assignment_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub placed: Vec<Placement>,
    pub unassigned: Vec<UnassignedAssignment>,
}

/// Places `assignments` into `slots` starting from an empty detector.
pub fn generate(
    assignments: &[TeachingAssignment],
    slots: &[TimeSlotCandidate],
) -> GenerationOutcome {
    generate_with(ClashDetector::new(), assignments, slots)
}

/// Places `assignments` into `slots`, respecting lecturer commitments already
/// recorded in `detector`.
pub fn generate_with(
    mut detector: ClashDetector,
    assignments: &[TeachingAssignment],
    slots: &[TimeSlotCandidate],
) -> GenerationOutcome {
    let mut outcome = GenerationOutcome::default();

    for assignment in assignments {
        if assignment.is_cancelled() {
            outcome.unassigned.push(UnassignedAssignment {
                assignment_id: assignment.id,
                reason: REASON_CANCELLED.to_string(),
            });
            continue;
        }

        let free = slots.iter().find(|slot| {
            !detector.has_clash(EntityKind::Lecturer, assignment.lecturer_id, &slot.window)
        });

        match free {
            Some(slot) => {
                detector.add_commitment(
                    EntityKind::Lecturer,
                    assignment.lecturer_id,
                    slot.window,
                );
                debug!(assignment = %assignment.id, slot = %slot.window, "placed assignment");
                outcome.placed.push(Placement::new(assignment, slot.window));
            }
            None => {
                debug!(assignment = %assignment.id, "no clash-free slot");
                outcome.unassigned.push(UnassignedAssignment {
                    assignment_id: assignment.id,
                    reason: REASON_NO_SLOT.to_string(),
                });
            }
        }
    }

    info!(
        placed = outcome.placed.len(),
        unassigned = outcome.unassigned.len(),
        "timetable generation finished"
    );
    outcome
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClashKind {
    LecturerClash,
    RoomClash,
}

/// Two live entries sharing a lecturer or room at overlapping times. The
/// earlier entry of the pair, in input order, is `entry1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClashRecord {
    #[serde(rename = "type")]
    pub kind: ClashKind,
    pub key_id: Uuid,
    pub entry1: TimetableEntry,
    pub entry2: TimetableEntry,
}

/// Reports every overlapping pair of live entries that share a lecturer, then
/// every pair that shares a room.
pub fn detect_clashes(entries: &[TimetableEntry]) -> Vec<ClashRecord> {
    let live: Vec<&TimetableEntry> = entries.iter().filter(|e| e.is_live()).collect();

    let mut records = pairwise(&live, ClashKind::LecturerClash, |e| e.lecturer_id);
    records.extend(pairwise(&live, ClashKind::RoomClash, |e| e.room_id));

    if !records.is_empty() {
        info!(clashes = records.len(), "timetable audit found clashes");
    }
    records
}

fn pairwise(
    entries: &[&TimetableEntry],
    kind: ClashKind,
    key: impl Fn(&TimetableEntry) -> Uuid,
) -> Vec<ClashRecord> {
    let mut groups: BTreeMap<Uuid, Vec<&TimetableEntry>> = BTreeMap::new();
    for &entry in entries {
        groups.entry(key(entry)).or_default().push(entry);
    }

    let mut records = Vec::new();
    for (key_id, group) in groups {
        for (i, first) in group.iter().enumerate() {
            for second in &group[i + 1..] {
                if first.window.overlaps(&second.window) {
                    records.push(ClashRecord {
                        kind,
                        key_id,
                        entry1: (*first).clone(),
                        entry2: (*second).clone(),
                    });
                }
            }
        }
    }
    records
}
