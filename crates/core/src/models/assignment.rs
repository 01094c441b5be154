use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TimeError;

/// Lifecycle of a teaching assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Confirmed => "confirmed",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AssignmentStatus::Pending),
            "confirmed" => Ok(AssignmentStatus::Confirmed),
            "cancelled" => Ok(AssignmentStatus::Cancelled),
            other => Err(TimeError::Validation(format!(
                "Unknown assignment status: {}",
                other
            ))),
        }
    }
}

/// A lecturer allocated to teach one unit of a course in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingAssignment {
    pub id: Uuid,
    pub lecturer_id: Uuid,
    pub unit_id: Uuid,
    pub course_id: Uuid,
    pub department_id: Uuid,
    pub room_id: Uuid,
    pub student_count: u32,
    pub status: AssignmentStatus,
}

impl TeachingAssignment {
    pub fn is_cancelled(&self) -> bool {
        self.status == AssignmentStatus::Cancelled
    }
}

/// Teaching room as seen by capacity audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub capacity: u32,
}
