//! # Slot Catalog & Availability
//!
//! The weekly catalog offers the same fifty windows to every assignment:
//! for each teaching day, six back-to-back 2-hour blocks and four
//! back-to-back 3-hour blocks, both running 07:00 to 19:00. It is rebuilt on
//! every call and never stored.
//!
//! Availability marks each catalog slot for one assignment. A slot is only
//! blocked ("red") by another assignment holding the *exact* same window; a
//! 3-hour block is not blocked by an overlapping 2-hour block. The
//! annotation is advisory, the commit protocol enforces the real rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ClockTime, SlotDuration, TimeSlotCandidate, TimeWindow, TimetableEntry, Weekday};
use crate::MAX_ENTRIES_PER_ASSIGNMENT;

const DAY_START_HOUR: u16 = 7;
const DAY_END_HOUR: u16 = 19;

/// Builds the fixed weekly catalog, ordered by day, then 2-hour blocks before
/// 3-hour blocks, then start time.
pub fn weekly_catalog() -> Vec<TimeSlotCandidate> {
    let mut slots = Vec::with_capacity(Weekday::ALL.len() * 10);
    for day in Weekday::ALL {
        for duration in [SlotDuration::TwoHours, SlotDuration::ThreeHours] {
            let mut start = DAY_START_HOUR * 60;
            while start + duration.minutes() <= DAY_END_HOUR * 60 {
                let end = start + duration.minutes();
                slots.push(TimeSlotCandidate {
                    window: TimeWindow {
                        day,
                        start: ClockTime::minutes_unchecked(start),
                        end: ClockTime::minutes_unchecked(end),
                    },
                    duration,
                });
                start = end;
            }
        }
    }
    slots
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// The assignment already holds this window.
    Selected,
    /// Another assignment holds this exact window.
    Red,
    /// The assignment is at its cap.
    Disabled,
    /// Free to select.
    Green,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSlot {
    #[serde(flatten)]
    pub slot: TimeSlotCandidate,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub assignment_id: Uuid,
    pub slots: Vec<AnnotatedSlot>,
    pub selected_count: usize,
    pub can_select_more: bool,
}

/// Annotates the catalog for `assignment_id` given every live entry in the
/// system.
pub fn compute_availability(
    assignment_id: Uuid,
    live_entries: &[TimetableEntry],
) -> AvailabilityReport {
    let live: Vec<&TimetableEntry> = live_entries.iter().filter(|e| e.is_live()).collect();
    let selected_count = live
        .iter()
        .filter(|e| e.assignment_id == assignment_id)
        .count();
    let can_select_more = selected_count < MAX_ENTRIES_PER_ASSIGNMENT;

    let slots = weekly_catalog()
        .into_iter()
        .map(|slot| {
            let holders = live.iter().filter(|e| e.window == slot.window);
            let status = if holders.clone().any(|e| e.assignment_id == assignment_id) {
                SlotStatus::Selected
            } else if holders.clone().next().is_some() {
                SlotStatus::Red
            } else if !can_select_more {
                SlotStatus::Disabled
            } else {
                SlotStatus::Green
            };
            AnnotatedSlot { slot, status }
        })
        .collect();

    AvailabilityReport {
        assignment_id,
        slots,
        selected_count,
        can_select_more,
    }
}
