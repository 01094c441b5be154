//! Stateless schedule rules and the bulk timetable audit.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{TimeError, TimeResult};
use crate::generator::{detect_clashes, ClashKind};
use crate::models::{TimeWindow, TimetableEntry};

pub fn validate_duration(hours: u32) -> bool {
    matches!(hours, 2 | 3)
}

pub fn validate_capacity(student_count: u32, room_capacity: u32) -> bool {
    student_count <= room_capacity
}

/// True when no two windows share the exact same day, start and end.
/// Overlapping but distinct windows pass.
pub fn validate_no_double_booking<'a>(slots: impl IntoIterator<Item = &'a TimeWindow>) -> bool {
    let mut seen = HashSet::new();
    slots.into_iter().all(|slot| seen.insert(*slot))
}

/// Facts the audit needs but entries do not carry.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    /// Enrolled students per teaching assignment.
    pub student_counts: HashMap<Uuid, u32>,
    /// Seats per room.
    pub room_capacities: HashMap<Uuid, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    /// Reserved; nothing produces warnings yet.
    pub warnings: Vec<String>,
}

/// Audits live entries for clashes and room capacity.
///
/// Missing student counts or room capacities are an error rather than a
/// pass, so an incomplete context can never make a timetable look valid.
pub fn validate_timetable(
    entries: &[TimetableEntry],
    context: &AuditContext,
) -> TimeResult<ValidationReport> {
    let mut errors = Vec::new();

    let clashes = detect_clashes(entries);
    let lecturer_clashes = clashes
        .iter()
        .filter(|c| c.kind == ClashKind::LecturerClash)
        .count();
    let room_clashes = clashes.len() - lecturer_clashes;
    if !clashes.is_empty() {
        errors.push(format!(
            "Found {} scheduling clashes ({} lecturer, {} room)",
            clashes.len(),
            lecturer_clashes,
            room_clashes
        ));
    }

    for entry in entries.iter().filter(|e| e.is_live()) {
        let students = *context
            .student_counts
            .get(&entry.assignment_id)
            .ok_or_else(|| {
                TimeError::NotFound(format!(
                    "Student count for assignment {} not found",
                    entry.assignment_id
                ))
            })?;
        let capacity = *context.room_capacities.get(&entry.room_id).ok_or_else(|| {
            TimeError::NotFound(format!("Room with ID {} not found", entry.room_id))
        })?;

        if !validate_capacity(students, capacity) {
            errors.push(format!(
                "Entry {}: {} students exceed room {} capacity of {}",
                entry.id, students, entry.room_id, capacity
            ));
        }
    }

    Ok(ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings: Vec::new(),
    })
}
