use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashMap;
use timetable_core::{
    catalog::{compute_availability, weekly_catalog, SlotStatus},
    clash::ClashDetector,
    errors::TimeError,
    generator::{
        detect_clashes, generate, generate_with, ClashKind, REASON_CANCELLED, REASON_NO_SLOT,
    },
    models::{
        AssignmentStatus, EntityKind, EntryStatus, TeachingAssignment, TimeSlotCandidate,
        TimeWindow, TimetableEntry, Weekday,
    },
    validator::{validate_timetable, AuditContext},
};
use uuid::Uuid;

fn window(day: Weekday, start: &str, end: &str) -> TimeWindow {
    TimeWindow::new(day, start.parse().unwrap(), end.parse().unwrap()).unwrap()
}

fn slot(day: Weekday, start: &str, end: &str) -> TimeSlotCandidate {
    TimeSlotCandidate::from_window(window(day, start, end)).unwrap()
}

fn assignment(lecturer_id: Uuid) -> TeachingAssignment {
    TeachingAssignment {
        id: Uuid::new_v4(),
        lecturer_id,
        unit_id: Uuid::new_v4(),
        course_id: Uuid::new_v4(),
        department_id: Uuid::new_v4(),
        room_id: Uuid::new_v4(),
        student_count: 30,
        status: AssignmentStatus::Pending,
    }
}

fn entry(assignment: &TeachingAssignment, window: TimeWindow) -> TimetableEntry {
    TimetableEntry::for_assignment(Uuid::new_v4(), assignment, window)
}

// Clash detector

#[rstest]
#[case("09:00", "11:00", "11:00", "13:00", false)]
#[case("09:00", "11:00", "10:00", "12:00", true)]
#[case("09:00", "12:00", "10:00", "11:00", true)]
#[case("07:00", "09:00", "07:00", "09:00", true)]
#[case("13:00", "16:00", "07:00", "13:00", false)]
fn test_overlap_is_symmetric(
    #[case] a_start: &str,
    #[case] a_end: &str,
    #[case] b_start: &str,
    #[case] b_end: &str,
    #[case] expected: bool,
) {
    let a = window(Weekday::Mon, a_start, a_end);
    let b = window(Weekday::Mon, b_start, b_end);
    assert_eq!(a.overlaps(&b), expected);
    assert_eq!(b.overlaps(&a), expected);
}

#[test]
fn test_detector_reports_every_overlap() {
    let lecturer = Uuid::new_v4();
    let mut detector = ClashDetector::new();
    for s in weekly_catalog().iter().filter(|s| s.window.day == Weekday::Tue) {
        detector.add_commitment(EntityKind::Lecturer, lecturer, s.window);
    }

    for candidate in weekly_catalog() {
        let expected = candidate.window.day == Weekday::Tue;
        assert_eq!(
            detector.has_clash(EntityKind::Lecturer, lecturer, &candidate.window),
            expected
        );
    }
}

// Generator

#[test]
fn test_first_free_slot_is_chosen() {
    let a = assignment(Uuid::new_v4());
    let slots = [
        slot(Weekday::Mon, "07:00", "09:00"),
        slot(Weekday::Mon, "09:00", "11:00"),
    ];

    let outcome = generate(&[a.clone()], &slots);

    assert_eq!(outcome.placed.len(), 1);
    assert_eq!(outcome.placed[0].assignment_id, a.id);
    assert_eq!(outcome.placed[0].window, window(Weekday::Mon, "07:00", "09:00"));
    assert!(outcome.unassigned.is_empty());
}

#[test]
fn test_earlier_assignment_wins_contested_slot() {
    let lecturer = Uuid::new_v4();
    let a = assignment(lecturer);
    let b = assignment(lecturer);
    let slots = [slot(Weekday::Mon, "07:00", "09:00")];

    let outcome = generate(&[a.clone(), b.clone()], &slots);

    assert_eq!(outcome.placed.len(), 1);
    assert_eq!(outcome.placed[0].assignment_id, a.id);
    assert_eq!(outcome.unassigned.len(), 1);
    assert_eq!(outcome.unassigned[0].assignment_id, b.id);
    assert_eq!(outcome.unassigned[0].reason, REASON_NO_SLOT);
    assert_eq!(REASON_NO_SLOT, "no available slot without clash");
}

#[test]
fn test_same_lecturer_moves_to_next_slot() {
    let lecturer = Uuid::new_v4();
    let a = assignment(lecturer);
    let b = assignment(lecturer);
    let slots = [
        slot(Weekday::Mon, "07:00", "09:00"),
        slot(Weekday::Mon, "07:00", "10:00"),
        slot(Weekday::Mon, "09:00", "11:00"),
    ];

    let outcome = generate(&[a, b.clone()], &slots);

    assert_eq!(outcome.placed[1].assignment_id, b.id);
    assert_eq!(outcome.placed[1].window, window(Weekday::Mon, "09:00", "11:00"));
}

#[test]
fn test_generation_ignores_room_collisions() {
    let a = assignment(Uuid::new_v4());
    let mut b = assignment(Uuid::new_v4());
    b.room_id = a.room_id;
    let slots = [slot(Weekday::Wed, "07:00", "09:00")];

    let outcome = generate(&[a, b], &slots);

    assert_eq!(outcome.placed.len(), 2);
    assert_eq!(outcome.placed[0].window, outcome.placed[1].window);

    let entries: Vec<TimetableEntry> = outcome
        .placed
        .into_iter()
        .map(|p| p.into_entry(Uuid::new_v4()))
        .collect();
    let clashes = detect_clashes(&entries);
    assert_eq!(clashes.len(), 1);
    assert_eq!(clashes[0].kind, ClashKind::RoomClash);
}

#[test]
fn test_generation_is_deterministic() {
    let lecturers: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let assignments: Vec<TeachingAssignment> = (0..40)
        .map(|i| assignment(lecturers[i % lecturers.len()]))
        .collect();
    let slots = weekly_catalog();

    let first = generate(&assignments, &slots);
    let second = generate(&assignments, &slots);

    assert_eq!(first, second);
    assert_eq!(first.placed.len() + first.unassigned.len(), assignments.len());
}

#[test]
fn test_cancelled_assignments_are_skipped() {
    let mut a = assignment(Uuid::new_v4());
    a.status = AssignmentStatus::Cancelled;

    let outcome = generate(&[a.clone()], &weekly_catalog());

    assert!(outcome.placed.is_empty());
    assert_eq!(outcome.unassigned[0].reason, REASON_CANCELLED);
}

#[test]
fn test_seeded_detector_blocks_busy_lecturer() {
    let a = assignment(Uuid::new_v4());
    let existing = entry(&a, window(Weekday::Mon, "07:00", "09:00"));
    let b = assignment(a.lecturer_id);
    let slots = [
        slot(Weekday::Mon, "07:00", "10:00"),
        slot(Weekday::Mon, "10:00", "13:00"),
    ];

    let detector = ClashDetector::lecturers_from_entries([&existing]);
    let outcome = generate_with(detector, &[b], &slots);

    assert_eq!(outcome.placed[0].window, window(Weekday::Mon, "10:00", "13:00"));
}

#[test]
fn test_placements_never_double_book_a_lecturer() {
    let lecturer = Uuid::new_v4();
    let assignments: Vec<TeachingAssignment> = (0..60).map(|_| assignment(lecturer)).collect();

    let outcome = generate(&assignments, &weekly_catalog());

    for (i, a) in outcome.placed.iter().enumerate() {
        for b in &outcome.placed[i + 1..] {
            assert!(!a.window.overlaps(&b.window), "{} overlaps {}", a.window, b.window);
        }
    }
    assert!(!outcome.unassigned.is_empty());
}

// Clash audit

#[test]
fn test_shared_room_yields_one_room_clash() {
    let a = assignment(Uuid::new_v4());
    let mut b = assignment(Uuid::new_v4());
    b.room_id = a.room_id;
    let first = entry(&a, window(Weekday::Thu, "09:00", "11:00"));
    let second = entry(&b, window(Weekday::Thu, "10:00", "13:00"));

    let clashes = detect_clashes(&[first.clone(), second.clone()]);

    assert_eq!(clashes.len(), 1);
    assert_eq!(clashes[0].kind, ClashKind::RoomClash);
    assert_eq!(clashes[0].key_id, a.room_id);
    assert_eq!((clashes[0].entry1.id, clashes[0].entry2.id), (first.id, second.id));
}

#[test]
fn test_shared_lecturer_and_room_yield_both_kinds() {
    let a = assignment(Uuid::new_v4());
    let mut b = assignment(a.lecturer_id);
    b.room_id = a.room_id;
    let entries = [
        entry(&a, window(Weekday::Fri, "07:00", "09:00")),
        entry(&b, window(Weekday::Fri, "07:00", "10:00")),
        entry(&b, window(Weekday::Fri, "10:00", "13:00")),
    ];

    let clashes = detect_clashes(&entries);

    assert_eq!(clashes.len(), 2);
    assert_eq!(clashes[0].kind, ClashKind::LecturerClash);
    assert_eq!(clashes[1].kind, ClashKind::RoomClash);
}

#[test]
fn test_cancelled_entries_are_not_audited() {
    let a = assignment(Uuid::new_v4());
    let b = assignment(a.lecturer_id);
    let mut cancelled = entry(&b, window(Weekday::Mon, "07:00", "09:00"));
    cancelled.status = EntryStatus::Cancelled;

    let clashes = detect_clashes(&[entry(&a, window(Weekday::Mon, "07:00", "09:00")), cancelled]);

    assert!(clashes.is_empty());
}

// Availability

#[test]
fn test_availability_statuses() {
    let mine = assignment(Uuid::new_v4());
    let other = assignment(Uuid::new_v4());
    let live = [
        entry(&mine, window(Weekday::Mon, "07:00", "09:00")),
        entry(&other, window(Weekday::Mon, "09:00", "11:00")),
    ];

    let report = compute_availability(mine.id, &live);
    let status_of = |w: TimeWindow| {
        report
            .slots
            .iter()
            .find(|s| s.slot.window == w)
            .map(|s| s.status)
            .unwrap()
    };

    assert_eq!(report.slots.len(), 50);
    assert_eq!(report.selected_count, 1);
    assert!(report.can_select_more);
    assert_eq!(status_of(window(Weekday::Mon, "07:00", "09:00")), SlotStatus::Selected);
    assert_eq!(status_of(window(Weekday::Mon, "09:00", "11:00")), SlotStatus::Red);
    // Overlaps the red 2-hour block but is not the same window.
    assert_eq!(status_of(window(Weekday::Mon, "10:00", "13:00")), SlotStatus::Green);
    assert_eq!(status_of(window(Weekday::Tue, "07:00", "09:00")), SlotStatus::Green);
}

#[test]
fn test_availability_disables_everything_at_cap() {
    let mine = assignment(Uuid::new_v4());
    let other = assignment(Uuid::new_v4());
    let live = [
        entry(&mine, window(Weekday::Mon, "07:00", "09:00")),
        entry(&mine, window(Weekday::Wed, "07:00", "10:00")),
        entry(&other, window(Weekday::Fri, "17:00", "19:00")),
    ];

    let report = compute_availability(mine.id, &live);
    let count = |status: SlotStatus| report.slots.iter().filter(|s| s.status == status).count();

    assert!(!report.can_select_more);
    assert_eq!(count(SlotStatus::Selected), 2);
    assert_eq!(count(SlotStatus::Red), 1);
    assert_eq!(count(SlotStatus::Disabled), 47);
    assert_eq!(count(SlotStatus::Green), 0);
}

// Bulk audit

#[test]
fn test_timetable_audit_reports_capacity_and_clashes() {
    let a = assignment(Uuid::new_v4());
    let mut b = assignment(Uuid::new_v4());
    b.room_id = a.room_id;
    b.student_count = 45;
    let entries = [
        entry(&a, window(Weekday::Tue, "07:00", "09:00")),
        entry(&b, window(Weekday::Tue, "07:00", "10:00")),
    ];
    let context = AuditContext {
        student_counts: HashMap::from([(a.id, a.student_count), (b.id, b.student_count)]),
        room_capacities: HashMap::from([(a.room_id, 40)]),
    };

    let report = validate_timetable(&entries, &context).unwrap();

    assert!(!report.valid);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].contains("1 scheduling clashes"));
    assert!(report.errors[1].contains("45 students"));
    assert!(report.warnings.is_empty());
}

#[test]
fn test_timetable_audit_passes_clean_timetable() {
    let a = assignment(Uuid::new_v4());
    let entries = [
        entry(&a, window(Weekday::Tue, "07:00", "09:00")),
        entry(&a, window(Weekday::Thu, "07:00", "09:00")),
    ];
    let context = AuditContext {
        student_counts: HashMap::from([(a.id, 30)]),
        room_capacities: HashMap::from([(a.room_id, 30)]),
    };

    let report = validate_timetable(&entries, &context).unwrap();

    assert!(report.valid);
    assert!(report.errors.is_empty());
}

#[test]
fn test_timetable_audit_fails_on_missing_room() {
    let a = assignment(Uuid::new_v4());
    let entries = [entry(&a, window(Weekday::Tue, "07:00", "09:00"))];
    let context = AuditContext {
        student_counts: HashMap::from([(a.id, 30)]),
        room_capacities: HashMap::new(),
    };

    let result = validate_timetable(&entries, &context);

    assert!(matches!(result, Err(TimeError::NotFound(_))));
}
