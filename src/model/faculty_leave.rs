use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::timetable::LeaveWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FacultyLeave {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 12)]
    pub faculty_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub leave_type: LeaveWindow,
    #[schema(example = "Conference", nullable = true)]
    pub reason: Option<String>,
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new leave; status always starts as pending.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub faculty_id: u64,
    pub date: NaiveDate,
    pub leave_type: LeaveWindow,
    pub reason: Option<String>,
}

/// Optional filters for listing leaves.
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub faculty_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
