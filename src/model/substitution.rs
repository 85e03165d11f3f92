use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AssignmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// How an assignment came to exist: the automatic assigner, a hand-picked
/// cover, or an accepted lecture transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AssignmentType {
    Auto,
    Manual,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubstitutionAssignment {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = 12)]
    pub src_faculty_id: u64,
    #[schema(example = 31)]
    pub sub_faculty_id: u64,
    #[schema(example = 4, nullable = true)]
    pub class_id: Option<u64>,
    #[schema(example = 9, nullable = true)]
    pub subject_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub start_time: Option<NaiveTime>,
    pub status: AssignmentStatus,
    pub assignment_type: AssignmentType,
    #[schema(nullable = true)]
    pub notes: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for one assignment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubstitution {
    pub src_faculty_id: u64,
    pub sub_faculty_id: u64,
    pub class_id: u64,
    pub subject_id: u64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: AssignmentStatus,
    pub assignment_type: AssignmentType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SubstitutionQuery {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub src_faculty_id: Option<u64>,
    pub sub_faculty_id: Option<u64>,
    pub status: Option<AssignmentStatus>,
}
