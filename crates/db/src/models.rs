use chrono::{DateTime, Utc};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timetable_core::models::{
    AssignmentStatus, ClockTime, EntryStatus, Room, TeachingAssignment, TimeSlotCandidate,
    TimeWindow, TimetableEntry, Weekday,
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRoom {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAssignment {
    pub id: Uuid,
    pub lecturer_id: Uuid,
    pub unit_id: Uuid,
    pub course_id: Uuid,
    pub department_id: Uuid,
    pub room_id: Uuid,
    pub student_count: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTimeSlot {
    pub id: Uuid,
    pub semester: String,
    pub year: i32,
    pub day: String,
    pub start_minute: i32,
    pub end_minute: i32,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEntry {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub lecturer_id: Uuid,
    pub unit_id: Uuid,
    pub course_id: Uuid,
    pub room_id: Uuid,
    pub day: String,
    pub start_minute: i32,
    pub end_minute: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

fn clock(minutes: i32) -> Result<ClockTime> {
    let minutes = u16::try_from(minutes).map_err(|_| eyre!("Stored minute out of range: {}", minutes))?;
    Ok(ClockTime::from_minutes(minutes)?)
}

fn window(day: &str, start_minute: i32, end_minute: i32) -> Result<TimeWindow> {
    let day: Weekday = day.parse()?;
    Ok(TimeWindow::new(day, clock(start_minute)?, clock(end_minute)?)?)
}

fn non_negative(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| eyre!("Negative {}: {}", column, value))
}

impl DbRoom {
    pub fn into_room(self) -> Result<Room> {
        Ok(Room {
            id: self.id,
            name: self.name,
            capacity: non_negative(self.capacity, "room capacity")?,
        })
    }
}

impl DbAssignment {
    pub fn into_assignment(self) -> Result<TeachingAssignment> {
        Ok(TeachingAssignment {
            id: self.id,
            lecturer_id: self.lecturer_id,
            unit_id: self.unit_id,
            course_id: self.course_id,
            department_id: self.department_id,
            room_id: self.room_id,
            student_count: non_negative(self.student_count, "student count")?,
            status: self.status.parse::<AssignmentStatus>()?,
        })
    }
}

impl DbTimeSlot {
    pub fn into_candidate(self) -> Result<TimeSlotCandidate> {
        Ok(TimeSlotCandidate::from_window(window(
            &self.day,
            self.start_minute,
            self.end_minute,
        )?)?)
    }
}

impl DbEntry {
    pub fn into_entry(self) -> Result<TimetableEntry> {
        Ok(TimetableEntry {
            id: self.id,
            assignment_id: self.assignment_id,
            lecturer_id: self.lecturer_id,
            unit_id: self.unit_id,
            course_id: self.course_id,
            room_id: self.room_id,
            window: window(&self.day, self.start_minute, self.end_minute)?,
            status: self.status.parse::<EntryStatus>()?,
        })
    }
}
