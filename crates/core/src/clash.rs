//! Per-entity registry of committed time windows.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{EntityKind, ScheduleCommitment, TimeWindow, TimetableEntry};

/// Answers "would this window collide with something already committed?"
/// for lecturers, rooms and student cohorts.
///
/// A detector is meant to be short-lived: build it from the live entries read
/// at the start of an operation and drop it when the operation ends.
#[derive(Debug, Default, Clone)]
pub struct ClashDetector {
    commitments: HashMap<(EntityKind, Uuid), Vec<TimeWindow>>,
}

impl ClashDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds every commitment claimed by the live entries in `entries`.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a TimetableEntry>) -> Self {
        let mut detector = Self::new();
        for entry in entries.into_iter().filter(|e| e.is_live()) {
            for commitment in entry.commitments() {
                detector.add(commitment);
            }
        }
        detector
    }

    /// Seeds only the lecturer commitments of the live entries in `entries`.
    pub fn lecturers_from_entries<'a>(
        entries: impl IntoIterator<Item = &'a TimetableEntry>,
    ) -> Self {
        let mut detector = Self::new();
        for entry in entries.into_iter().filter(|e| e.is_live()) {
            detector.add_commitment(EntityKind::Lecturer, entry.lecturer_id, entry.window);
        }
        detector
    }

    pub fn add_commitment(&mut self, kind: EntityKind, entity_id: Uuid, window: TimeWindow) {
        self.commitments
            .entry((kind, entity_id))
            .or_default()
            .push(window);
    }

    pub fn add(&mut self, commitment: ScheduleCommitment) {
        self.add_commitment(commitment.entity_kind, commitment.entity_id, commitment.window);
    }

    pub fn has_clash(&self, kind: EntityKind, entity_id: Uuid, window: &TimeWindow) -> bool {
        self.windows(kind, entity_id)
            .iter()
            .any(|committed| committed.overlaps(window))
    }

    /// Every committed window of the commitment's entity that it overlaps.
    pub fn clashes_for(&self, commitment: &ScheduleCommitment) -> Vec<TimeWindow> {
        self.windows(commitment.entity_kind, commitment.entity_id)
            .iter()
            .filter(|committed| committed.overlaps(&commitment.window))
            .copied()
            .collect()
    }

    /// Number of recorded commitments, duplicates included.
    pub fn len(&self) -> usize {
        self.commitments.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn windows(&self, kind: EntityKind, entity_id: Uuid) -> &[TimeWindow] {
        self.commitments
            .get(&(kind, entity_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
